//! Error types for the export pipeline.

use garmin_connect_client::GarminError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Export errors. None of them are recovered from; each one ends the run.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Garmin Connect error: {0}")]
    Source(#[from] GarminError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("archive error on {}: {source}", .path.display())]
    Archive {
        path: PathBuf,
        source: zip::result::ZipError,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExportError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn archive(path: impl AsRef<Path>, source: zip::result::ZipError) -> Self {
        ExportError::Archive {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result type alias for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_names_path() {
        let e = ExportError::io(
            "/tmp/out/activity_1.gpx",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "I/O error on /tmp/out/activity_1.gpx: denied");
    }

    #[test]
    fn source_errors_convert() {
        let e: ExportError = GarminError::Auth("bad password".into()).into();
        assert!(matches!(e, ExportError::Source(GarminError::Auth(_))));
    }
}
