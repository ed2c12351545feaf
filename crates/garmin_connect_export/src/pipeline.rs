//! The export loop: enumerate activities, download files, append ledger rows.
//!
//! Activities are handled strictly one after another. For each one the ledger
//! row is built first (so a malformed record aborts before anything is
//! written), then the data file is downloaded unless it already exists, then
//! the row is appended, then the file is post-processed. Any error ends the
//! run; because files are only ever skipped when present, re-running with the
//! same settings resumes where the failed run stopped.

use crate::archive;
use crate::config::ExportConfig;
use crate::error::{ExportError, ExportResult};
use crate::gpx;
use crate::ledger::{self, Ledger};
use garmin_connect_client::paging::DEFAULT_PAGE_SIZE;
use garmin_connect_client::{ActivityPager, ActivityRecord, ActivitySource, FileFormat};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// `<directory>/activity_<id>.<ext>`
pub fn data_file_path(directory: &Path, activity_id: i64, format: FileFormat) -> PathBuf {
    directory.join(format!("activity_{activity_id}.{}", format.extension()))
}

/// `<directory>/<id>.fit`, left behind when an original archive was extracted.
pub fn fit_file_path(directory: &Path, activity_id: i64) -> PathBuf {
    directory.join(format!("{activity_id}.fit"))
}

/// Counters for one run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Activities that got a ledger row.
    pub processed: u32,
    pub downloaded: u32,
    /// Activities whose data file was already on disk.
    pub skipped: u32,
    pub extracted: u32,
}

pub struct ExportPipeline<'a, S: ?Sized> {
    source: &'a S,
    config: &'a ExportConfig,
    page_size: u32,
}

impl<'a, S: ActivitySource + ?Sized> ExportPipeline<'a, S> {
    pub fn new(source: &'a S, config: &'a ExportConfig) -> Self {
        Self {
            source,
            config,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Run the export until the history or the configured count is exhausted.
    /// The output directory must already exist.
    pub async fn run(&self) -> ExportResult<ExportSummary> {
        let mut ledger = Ledger::open(&self.config.directory).await?;
        if !ledger.created() {
            tracing::info!(
                path = %ledger.path().display(),
                "appending to existing ledger"
            );
        }
        let mut pager = ActivityPager::new(
            self.source,
            self.config.ordering,
            self.config.count.limit(),
        )
        .with_page_size(self.page_size);

        let mut summary = ExportSummary::default();
        while let Some(record) = pager.next().await? {
            self.process(&record, &mut ledger, &mut summary).await?;
        }
        Ok(summary)
    }

    async fn process(
        &self,
        record: &ActivityRecord,
        ledger: &mut Ledger,
        summary: &mut ExportSummary,
    ) -> ExportResult<()> {
        let id = record.id()?;
        let row = ledger::format_row(record)?;
        tracing::info!(
            activity_id = id,
            name = record.name(),
            begin = %record.begin_timestamp_utc()?,
            duration_s = record.duration_sec()?,
            distance_km = record.distance_km()?,
            "Garmin Connect activity"
        );

        let mut downloaded = None;
        if let Some(format) = self.config.format.file_format() {
            if let Some(existing) = self.existing_artifact(id, format).await? {
                tracing::info!(
                    activity_id = id,
                    path = %existing.display(),
                    "data file already exists; skipping download"
                );
                summary.skipped += 1;
            } else {
                tracing::info!(activity_id = id, %format, "downloading file");
                let data = self.source.fetch_file(id, format).await?;
                let path = data_file_path(&self.config.directory, id, format);
                write_file(&path, &data).await?;
                summary.downloaded += 1;
                downloaded = Some((format, path, data));
            }
        }

        ledger.append(&row).await?;
        summary.processed += 1;

        match downloaded {
            Some((FileFormat::Gpx, _, data)) => gpx::report(id, &data),
            Some((FileFormat::Original, path, _)) if self.config.unzip && archive::is_zip(&path) => {
                tracing::info!(activity_id = id, "unzipping and removing original file");
                let entries = archive::extract_and_remove(&path, &self.config.directory).await?;
                summary.extracted += entries.len() as u32;
                tracing::info!(activity_id = id, "Done.");
            }
            _ => tracing::info!(activity_id = id, "Done."),
        }
        Ok(())
    }

    /// Path of a previously written artifact for this activity, if any.
    async fn existing_artifact(
        &self,
        activity_id: i64,
        format: FileFormat,
    ) -> ExportResult<Option<PathBuf>> {
        let mut candidates = vec![data_file_path(&self.config.directory, activity_id, format)];
        if format == FileFormat::Original {
            candidates.push(fit_file_path(&self.config.directory, activity_id));
        }
        for path in candidates {
            if tokio::fs::try_exists(&path)
                .await
                .map_err(|e| ExportError::io(&path, e))?
            {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }
}

/// Write through a `.part` file and rename, so an interrupted write never
/// leaves a file that a later run would mistake for a finished download.
async fn write_file(path: &Path, data: &[u8]) -> ExportResult<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);

    let mut file = tokio::fs::File::create(&partial)
        .await
        .map_err(|e| ExportError::io(&partial, e))?;
    file.write_all(data)
        .await
        .map_err(|e| ExportError::io(&partial, e))?;
    file.sync_all()
        .await
        .map_err(|e| ExportError::io(&partial, e))?;
    drop(file);
    tokio::fs::rename(&partial, path)
        .await
        .map_err(|e| ExportError::io(path, e))
}
