// =============================================================================
// Blue Carbon Map - Error Types
// =============================================================================

use std::path::PathBuf;

/// Errors raised by the map core.
///
/// Data problems on individual records are not errors: ingestion rejects
/// those records and reports them in an `IngestReport` instead.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("Degenerate map extent: {0}")]
    DegenerateExtent(String),

    #[error("Invalid margin {0}%: must be finite and in [0, 50)")]
    InvalidMargin(f64),

    #[error("Unknown ecosystem record: {0}")]
    UnknownRecord(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(String),

    #[error("Backend '{0}' selected but its [view.{0}] section is missing")]
    MissingBackend(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;
