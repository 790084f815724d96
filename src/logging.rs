use anyhow::Result;
use tracing_subscriber::EnvFilter;

/// Overrides the verbosity flags when set, e.g. `AUTO_ASSET_TOOL_LOG=auto_asset_tool=trace`.
pub const LOG_ENV: &str = "AUTO_ASSET_TOOL_LOG";

pub fn init(verbose: u8, quiet: bool) -> Result<()> {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
