use garmin_connect_client::{
    ActivitySource, FileFormat, config::Config, http_client::ReqwestGarminClient,
};
use std::path::PathBuf;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = Config::from_env()?;

    let activity_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GARMIN_CONNECT_ACTIVITY_ID").ok());

    let Some(activity_id) = activity_id else {
        eprintln!(
            "usage: cargo run -p garmin_connect_client --example fetch_activity_file -- <activity_id>"
        );
        eprintln!("or set GARMIN_CONNECT_ACTIVITY_ID");
        return Ok(());
    };
    let activity_id: i64 = activity_id.parse()?;

    let output_path = std::env::var("GARMIN_CONNECT_OUTPUT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(format!("activity_{activity_id}.gpx")));

    let client = ReqwestGarminClient::from_config(&cfg);
    client.authenticate(&cfg.credentials(None, None)?).await?;

    let data = client
        .fetch_file(activity_id, FileFormat::Gpx)
        .await
        .map_err(|e| format!("download failed: {}", e))?;
    std::fs::write(&output_path, data)?;

    println!("Saved activity {activity_id} to {}", output_path.display());
    Ok(())
}
