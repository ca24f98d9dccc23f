use std::path::PathBuf;

use thiserror::Error;

/// A GPX file that cannot be turned into a track. The file is skipped.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Also covers coordinates outside the GPX schema bounds.
    #[error("GPX parsing error: {0}")]
    Gpx(String),

    #[error("No track points found in GPX file")]
    NoTrackPoints,
}

/// A failed reverse-geocoding lookup. The record degrades to an unknown location.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lookup timed out")]
    Timeout,

    #[error("Rate limited by geocoding service")]
    RateLimited,

    #[error("Geocoding service returned status {0}")]
    Status(u16),

    #[error("Malformed geocoding response: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl ResolutionError {
    /// Whether one more attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ResolutionError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ResolutionError::Timeout | ResolutionError::RateLimited => true,
            ResolutionError::Status(code) => *code >= 500,
            ResolutionError::Malformed(_) => false,
        }
    }
}

/// Whole-run failures. These abort the build with a nonzero exit.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Input directory not found: {}", .0.display())]
    InputDirMissing(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interrupted before the catalog was written")]
    Interrupted,
}

impl CatalogError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }
}

/// A catalog document the consumer cannot render.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Catalog is empty")]
    Empty,

    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ResolutionError::Timeout.is_transient());
        assert!(ResolutionError::RateLimited.is_transient());
        assert!(ResolutionError::Status(503).is_transient());
        assert!(!ResolutionError::Status(404).is_transient());

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(!ResolutionError::Malformed(json_err).is_transient());
    }

    #[test]
    fn test_catalog_error_messages() {
        let err = CatalogError::InputDirMissing(PathBuf::from("assets/gpx"));
        assert_eq!(err.to_string(), "Input directory not found: assets/gpx");

        let err = CatalogError::io(
            "out/catalog.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error on out/catalog.json: denied");
    }
}
