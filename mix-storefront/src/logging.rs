//! Logging setup

use tracing_subscriber::EnvFilter;

/// Initialize the logger
///
/// Honors `RUST_LOG`; defaults to `info`. Production gets JSON lines,
/// development gets the human-readable formatter.
pub fn init_logging(production: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if production {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
