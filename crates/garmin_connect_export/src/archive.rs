//! Extraction of original-format downloads.

use crate::error::{ExportError, ExportResult};
use std::path::{Path, PathBuf};

pub fn is_zip(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("zip"))
}

/// Extract every entry of `archive_path` into `directory`, then delete the
/// archive. Returns the paths of the extracted entries.
///
/// The zip reader is synchronous, so the work runs on tokio's blocking pool.
pub async fn extract_and_remove(
    archive_path: &Path,
    directory: &Path,
) -> ExportResult<Vec<PathBuf>> {
    let (archive, dir) = (archive_path.to_path_buf(), directory.to_path_buf());
    tokio::task::spawn_blocking(move || extract_blocking(&archive, &dir))
        .await
        .map_err(|e| ExportError::io(archive_path, std::io::Error::other(e)))?
}

fn extract_blocking(archive_path: &Path, directory: &Path) -> ExportResult<Vec<PathBuf>> {
    let file = std::fs::File::open(archive_path).map_err(|e| ExportError::io(archive_path, e))?;
    let mut archive =
        zip::ZipArchive::new(file).map_err(|e| ExportError::archive(archive_path, e))?;
    let entries: Vec<PathBuf> = archive.file_names().map(|n| directory.join(n)).collect();
    archive
        .extract(directory)
        .map_err(|e| ExportError::archive(archive_path, e))?;
    drop(archive);
    std::fs::remove_file(archive_path).map_err(|e| ExportError::io(archive_path, e))?;
    tracing::debug!(
        archive = %archive_path.display(),
        entries = entries.len(),
        "extracted and removed archive"
    );
    Ok(entries)
}
