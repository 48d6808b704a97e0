use std::path::PathBuf;
use thiserror::Error;

/// Fatal build failures. Per-note problems are [`crate::model::ZettelError`]s instead.
#[derive(Debug, Error)]
pub enum ZettelkastenError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Running version {running} is older than the minimum required version {required}")]
    VersionTooOld { required: String, running: String },
    #[error("Invalid version string: {0:?}")]
    InvalidVersion(String),
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("Cache error: {0}")]
    Cache(String),
    #[error("Route write failed: {0}")]
    Route(String),
}

impl ZettelkastenError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ZettelkastenError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<bincode::Error> for ZettelkastenError {
    fn from(src: bincode::Error) -> Self {
        ZettelkastenError::Cache(format!("bincode (de)serialization error: {src}"))
    }
}

pub type Result<T> = std::result::Result<T, ZettelkastenError>;
