use tracing_subscriber::EnvFilter;

/// Install a formatted tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_logging(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
