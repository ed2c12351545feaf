//! Append-only CSV summary of every processed activity.

use crate::error::{ExportError, ExportResult};
use garmin_connect_client::{ActivityRecord, GarminError};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

pub const LEDGER_FILE_NAME: &str = "activities.csv";

pub const HEADER: &str = "Activity ID,Activity Name,Description,Begin Timestamp,End Timestamp,\
Activity Type,Distance (km),Duration (s),Max. Heart Rate (bpm),Avg. Heart Rate (bpm),\
Begin Latitude (Decimal Degrees Raw),Begin Longitude (Decimal Degrees Raw)";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The ledger file, held open in append mode for the whole run.
///
/// The handle is released when the ledger is dropped, which also covers runs
/// that end with an error.
pub struct Ledger {
    path: PathBuf,
    file: File,
    created: bool,
}

impl Ledger {
    /// Open `<directory>/activities.csv`, writing the header only if the file
    /// did not exist yet.
    pub async fn open(directory: &Path) -> ExportResult<Self> {
        let path = directory.join(LEDGER_FILE_NAME);
        let existed = tokio::fs::try_exists(&path)
            .await
            .map_err(|e| ExportError::io(&path, e))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| ExportError::io(&path, e))?;
        if !existed {
            file.write_all(format!("{HEADER}\n").as_bytes())
                .await
                .map_err(|e| ExportError::io(&path, e))?;
            file.flush().await.map_err(|e| ExportError::io(&path, e))?;
            tracing::debug!(path = %path.display(), "created ledger");
        }
        Ok(Self {
            path,
            file,
            created: !existed,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether this run created the file (and wrote the header).
    pub fn created(&self) -> bool {
        self.created
    }

    /// Append one pre-formatted row (see [`format_row`]).
    pub async fn append(&mut self, row: &str) -> ExportResult<()> {
        self.file
            .write_all(format!("{row}\n").as_bytes())
            .await
            .map_err(|e| ExportError::io(&self.path, e))?;
        self.file
            .flush()
            .await
            .map_err(|e| ExportError::io(&self.path, e))
    }
}

/// Build the ledger row for one activity. Every getter is evaluated here, so a
/// malformed record fails before anything is written for it.
pub fn format_row(record: &ActivityRecord) -> Result<String, GarminError> {
    let fields = [
        record.id()?.to_string(),
        record.name().to_string(),
        record.comment(),
        record
            .begin_timestamp_utc()?
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        record.end_timestamp_utc()?.format(TIMESTAMP_FORMAT).to_string(),
        record.category()?.to_string(),
        record.distance_km()?.to_string(),
        record.duration_sec()?.to_string(),
        optional(record.max_heart_rate_bpm()?),
        optional(record.avg_heart_rate_bpm()?),
        optional(record.begin_latitude()?),
        optional(record.begin_longitude()?),
    ];
    Ok(fields
        .iter()
        .map(|f| csv_field(f))
        .collect::<Vec<_>>()
        .join(","))
}

fn optional(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

/// Quote a field only when it would otherwise break the row.
pub fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
