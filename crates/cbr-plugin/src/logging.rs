use tracing_subscriber::EnvFilter;

/// Env var holding the `tracing` filter directives for the plugin (e.g. `cbr_core=debug`).
pub const LOG_ENV: &str = "CBR_LOG";

/// Installs a stderr `fmt` subscriber unless the process already has one.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
