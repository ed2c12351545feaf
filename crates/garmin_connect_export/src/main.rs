use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use garmin_connect_client::config::Config;
use garmin_connect_client::http_client::ReqwestGarminClient;
use garmin_connect_client::{ActivitySource, Ordering};
use garmin_connect_export::config::default_directory;
use garmin_connect_export::{ActivityCount, ExportConfig, ExportFormat, ExportPipeline, logging};
use secrecy::SecretString;

/// Export your activities from Garmin Connect.
#[derive(Debug, Parser)]
#[command(name = "garmin_connect_export", version)]
struct Cli {
    /// Garmin Connect username (otherwise GARMIN_CONNECT_USERNAME)
    #[arg(long)]
    username: Option<String>,

    /// Garmin Connect password (otherwise GARMIN_CONNECT_PASSWORD)
    #[arg(long)]
    password: Option<String>,

    /// Number of recent activities to download, or 'all'
    #[arg(short, long, default_value = "1")]
    count: ActivityCount,

    /// Export format; 'none' only writes the CSV ledger
    #[arg(short, long, value_enum, default_value_t = ExportFormat::Gpx)]
    format: ExportFormat,

    /// Directory to export to (default: ./YYYY-MM-DD_garmin_connect_export)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// For 'original' downloads, unzip the archive and remove the zip file
    #[arg(short, long)]
    unzip: bool,

    /// Start with the oldest activity (otherwise starts with the newest)
    #[arg(short, long)]
    reverse: bool,
}

impl Cli {
    fn export_config(&self, today: chrono::NaiveDate) -> ExportConfig {
        ExportConfig {
            directory: self
                .directory
                .clone()
                .unwrap_or_else(|| default_directory(today)),
            format: self.format,
            ordering: if self.reverse {
                Ordering::OldestFirst
            } else {
                Ordering::NewestFirst
            },
            count: self.count,
            unzip: self.unzip,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init();
    tracing::info!("Welcome to Garmin Connect Exporter!");

    let env = Config::from_env()?;
    let export = cli.export_config(chrono::Local::now().date_naive());

    if export.directory.is_dir() {
        tracing::warn!(
            "Output directory already exists. Will skip already-downloaded files and append to the CSV file."
        );
    }

    let credentials = env.credentials(
        cli.username.clone(),
        cli.password.clone().map(|p| SecretString::new(p.into())),
    )?;
    let client = ReqwestGarminClient::from_config(&env);
    client
        .authenticate(&credentials)
        .await
        .context("login to Garmin Connect failed")?;

    tokio::fs::create_dir_all(&export.directory)
        .await
        .with_context(|| format!("creating {}", export.directory.display()))?;

    let summary = ExportPipeline::new(&client, &export).run().await?;
    tracing::info!(
        processed = summary.processed,
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        extracted = summary.extracted,
        "Done!"
    );
    Ok(())
}
