//! Catalog consumption: the data side of the course listing page.
//!
//! Selection is a pure function of the loaded catalog and the filter inputs;
//! rendering only formats the selected courses. Nothing here touches the
//! network after the catalog has been loaded.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::errors::SchemaError;
use crate::models::{Catalog, Course};

/// Parses a catalog document. Any malformed record rejects the whole
/// document so that no partially-defined course is ever displayed.
pub fn load_catalog(json: &str) -> Result<Catalog, SchemaError> {
    if json.trim().is_empty() {
        return Err(SchemaError::Empty);
    }
    Ok(serde_json::from_str(json)?)
}

/// Filter inputs. Unset bounds and an unset location match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub min_distance: Option<f64>,
    pub max_distance: Option<f64>,
    pub location: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, course: &Course) -> bool {
        let min = self.min_distance.unwrap_or(f64::NEG_INFINITY);
        let max = self.max_distance.unwrap_or(f64::INFINITY);
        let in_range = min <= course.distance && course.distance <= max;
        let location_ok = match self.location.as_deref() {
            None | Some("") => true,
            Some(location) => course.location == location,
        };
        in_range && location_ok
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Courses matching `criteria`, in catalog order.
pub fn filter_courses<'a>(catalog: &'a [Course], criteria: &FilterCriteria) -> Vec<&'a Course> {
    catalog
        .iter()
        .filter(|course| criteria.matches(course))
        .collect()
}

/// Distinct locations for the location selector, sorted.
pub fn location_options(catalog: &[Course]) -> Vec<String> {
    catalog
        .iter()
        .map(|course| course.location.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Download name for a course: `Mont Blanc Loop` becomes `mont-blanc-loop.gpx`.
pub fn download_file_name(name: &str) -> String {
    format!("{}.gpx", name.to_lowercase().replace(' ', "-"))
}

/// Joins a record's `file` onto the asset base URL, with or without a
/// leading `/` on the file.
pub fn resolve_file_url(base: &str, file: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        file.trim_start_matches('/')
    )
}

/// Display data for one course card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseCard {
    pub title: String,
    pub summary: String,
    pub download_name: String,
    pub file_url: String,
}

impl CourseCard {
    pub fn render(course: &Course, asset_base: &str) -> Self {
        Self {
            title: course.name.clone(),
            summary: format!(
                "{:.1} km · {:.0} m · {}",
                course.distance, course.elevation_gain, course.location
            ),
            download_name: download_file_name(&course.name),
            file_url: resolve_file_url(asset_base, &course.file),
        }
    }
}

/// The full course list held by the page, plus the active filter.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub all_courses: Catalog,
    pub criteria: FilterCriteria,
}

impl AppState {
    pub fn new(all_courses: Catalog) -> Self {
        Self {
            all_courses,
            criteria: FilterCriteria::default(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        load_catalog(json).map(Self::new)
    }

    pub fn apply(&mut self, criteria: FilterCriteria) -> Vec<&Course> {
        self.criteria = criteria;
        self.visible()
    }

    /// Clears the filter; every course becomes visible again.
    pub fn reset(&mut self) -> Vec<&Course> {
        self.apply(FilterCriteria::default())
    }

    pub fn visible(&self) -> Vec<&Course> {
        filter_courses(&self.all_courses, &self.criteria)
    }

    pub fn cards(&self, asset_base: &str) -> Vec<CourseCard> {
        self.visible()
            .into_iter()
            .map(|course| CourseCard::render(course, asset_base))
            .collect()
    }

    pub fn location_options(&self) -> Vec<String> {
        location_options(&self.all_courses)
    }
}
