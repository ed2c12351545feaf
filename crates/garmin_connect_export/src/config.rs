//! Run configuration, built once at startup and handed to the pipeline.

use chrono::NaiveDate;
use garmin_connect_client::{FileFormat, Ordering};
use std::path::PathBuf;
use std::str::FromStr;

/// What to save per activity, on top of the ledger row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Gpx,
    Tcx,
    Csv,
    Original,
    /// Only write the ledger.
    None,
}

impl ExportFormat {
    pub fn file_format(self) -> Option<FileFormat> {
        match self {
            ExportFormat::Gpx => Some(FileFormat::Gpx),
            ExportFormat::Tcx => Some(FileFormat::Tcx),
            ExportFormat::Csv => Some(FileFormat::Csv),
            ExportFormat::Original => Some(FileFormat::Original),
            ExportFormat::None => None,
        }
    }
}

/// Number of activities to export: the most recent `n`, or the whole history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivityCount {
    All,
    Recent(u32),
}

impl ActivityCount {
    pub fn limit(self) -> Option<u32> {
        match self {
            ActivityCount::All => None,
            ActivityCount::Recent(n) => Some(n),
        }
    }
}

impl FromStr for ActivityCount {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(ActivityCount::All);
        }
        match s.parse::<u32>() {
            Ok(n) if n > 0 => Ok(ActivityCount::Recent(n)),
            _ => Err(format!("expected a positive number or 'all', got '{s}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    pub directory: PathBuf,
    pub format: ExportFormat,
    pub ordering: Ordering,
    pub count: ActivityCount,
    /// Extract downloaded original archives and delete the zip.
    pub unzip: bool,
}

impl ExportConfig {
    pub fn new(directory: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
            ordering: Ordering::NewestFirst,
            count: ActivityCount::Recent(1),
            unzip: false,
        }
    }
}

/// `./YYYY-MM-DD_garmin_connect_export` for the given day.
pub fn default_directory(today: NaiveDate) -> PathBuf {
    PathBuf::from(format!("./{}_garmin_connect_export", today.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_parses_number_or_all() {
        assert_eq!("3".parse::<ActivityCount>(), Ok(ActivityCount::Recent(3)));
        assert_eq!("all".parse::<ActivityCount>(), Ok(ActivityCount::All));
        assert_eq!("ALL".parse::<ActivityCount>(), Ok(ActivityCount::All));
        assert!("0".parse::<ActivityCount>().is_err());
        assert!("-2".parse::<ActivityCount>().is_err());
        assert!("many".parse::<ActivityCount>().is_err());
        assert_eq!(ActivityCount::All.limit(), None);
        assert_eq!(ActivityCount::Recent(5).limit(), Some(5));
    }

    #[test]
    fn default_directory_is_dated() {
        let day = NaiveDate::from_ymd_opt(2016, 2, 17).unwrap();
        assert_eq!(
            default_directory(day),
            PathBuf::from("./2016-02-17_garmin_connect_export")
        );
    }

    #[test]
    fn none_format_has_no_file() {
        assert_eq!(ExportFormat::None.file_format(), None);
        assert_eq!(ExportFormat::Original.file_format(), Some(FileFormat::Original));
    }

    #[test]
    fn new_config_defaults_to_newest_single_activity() {
        let cfg = ExportConfig::new("/tmp/x", ExportFormat::Gpx);
        assert_eq!(cfg.ordering, Ordering::NewestFirst);
        assert_eq!(cfg.count, ActivityCount::Recent(1));
        assert!(!cfg.unzip);
    }
}
