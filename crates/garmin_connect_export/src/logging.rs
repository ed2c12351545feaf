use tracing_subscriber::EnvFilter;

/// Per-target overrides that keep the HTTP stack quiet by default.
const QUIET_TARGETS: &str = "reqwest=warn,hyper=warn,hyper_util=warn";

/// Log level from `GARMIN_EXPORT_LOG_LEVEL`, falling back to `RUST_LOG`, then `info`.
pub fn log_level_from_env() -> String {
    std::env::var("GARMIN_EXPORT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string())
}

pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(format!("{log_level},{QUIET_TARGETS}"))
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{QUIET_TARGETS}")))
}

/// Install the global subscriber: compact lines on stderr.
pub fn init() {
    let log_level = log_level_from_env();
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter(&log_level))
        .init();
    tracing::debug!("log filter: {}", log_level);
}
