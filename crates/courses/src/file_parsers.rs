//! GPX track parsing.
//!
//! Flattens every track and segment of a GPX document into one ordered
//! sequence of [`TrackPoint`]s. Points missing elevation or time keep those
//! fields as `None`; nothing is defaulted to zero.
//!
//! Coordinate bounds come from the GPX 1.1 schema and are enforced by the
//! `gpx` reader: latitude in [-90, 90], longitude in [-180, 180). A point
//! outside them fails the whole file with [`ParseError::Gpx`].

use std::io::{BufReader, Read};
use std::path::Path;

use gpx::Gpx;
use time::OffsetDateTime;
use tracing::debug;

use crate::errors::ParseError;
use crate::models::{Track, TrackPoint};

/// Reads and parses a GPX file from disk.
pub fn parse_gpx_file(path: impl AsRef<Path>) -> Result<Track, ParseError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    parse_gpx(BufReader::new(file), path)
}

/// Parses GPX data from any reader, tagging the track with `source`.
pub fn parse_gpx<R: Read>(reader: R, source: impl AsRef<Path>) -> Result<Track, ParseError> {
    let gpx: Gpx = gpx::read(reader).map_err(|e| ParseError::Gpx(e.to_string()))?;

    let mut points = Vec::new();
    let mut segment_index = 0;

    for track in &gpx.tracks {
        for seg in &track.segments {
            for waypoint in &seg.points {
                let point = waypoint.point();
                let sequence = points.len();

                points.push(TrackPoint {
                    lat: point.y(),
                    lon: point.x(),
                    elevation: waypoint.elevation.filter(|e| e.is_finite()),
                    timestamp: waypoint.time.map(OffsetDateTime::from),
                    sequence,
                    segment: segment_index,
                });
            }
            segment_index += 1;
        }
    }

    if points.is_empty() {
        return Err(ParseError::NoTrackPoints);
    }

    debug!(
        "parsed {} points in {} segments from {}",
        points.len(),
        segment_index,
        source.as_ref().display()
    );

    Ok(Track::new(source.as_ref(), points))
}
