//! Export Garmin Connect activities to local files plus a CSV ledger.

pub mod archive;
pub mod config;
pub mod error;
pub mod gpx;
pub mod ledger;
pub mod logging;
pub mod pipeline;

pub use config::{ActivityCount, ExportConfig, ExportFormat};
pub use error::{ExportError, ExportResult};
pub use pipeline::{ExportPipeline, ExportSummary};
