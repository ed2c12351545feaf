//! Garmin Connect client: the `ActivitySource` trait, the typed
//! [`ActivityRecord`](activity::ActivityRecord) view and a reqwest-based source.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod activity;
pub mod config;
pub mod http_client;
pub mod paging;
pub mod utils;

pub use activity::ActivityRecord;
pub use paging::ActivityPager;

#[derive(Debug, Error)]
pub enum GarminError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed activity record: {0}")]
    MalformedRecord(String),
    #[error("{field} has the wrong unit: expected '{expected}', got '{found}'")]
    UnitMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

impl GarminError {
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        GarminError::Status {
            status,
            body: body.into(),
        }
    }

    /// True for errors raised by the transport or the remote service rather
    /// than by the shape of the data it returned.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            GarminError::Http(_) | GarminError::NotFound(_) | GarminError::Status { .. }
        )
    }
}

/// Login credentials for the service.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

/// File representation the service can export an activity as.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Gpx,
    Tcx,
    Csv,
    /// The service's native upload, usually a zip wrapping a `.fit` file.
    Original,
}

impl FileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            FileFormat::Gpx => "gpx",
            FileFormat::Tcx => "tcx",
            FileFormat::Csv => "csv",
            FileFormat::Original => "original",
        }
    }

    /// Extension of the file written to disk for this format.
    pub fn extension(self) -> &'static str {
        match self {
            FileFormat::Original => "zip",
            other => other.as_str(),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction in which activity history is walked.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// One page of the activity search, newest-first as the service returns it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActivityPage {
    pub activities: Vec<serde_json::Value>,
    pub total_found: u32,
}

#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Establish the session used by the other calls.
    async fn authenticate(&self, credentials: &Credentials) -> Result<(), GarminError>;

    /// Fetch `limit` raw activity objects starting at index `start` of the
    /// newest-first history.
    async fn fetch_activity_page(&self, start: u32, limit: u32)
    -> Result<ActivityPage, GarminError>;

    /// Download the payload of one activity in the given format.
    async fn fetch_file(&self, activity_id: i64, format: FileFormat)
    -> Result<Vec<u8>, GarminError>;
}
