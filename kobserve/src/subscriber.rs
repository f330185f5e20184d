use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber filtered by `RUST_LOG`, or `default_directive` when
/// `RUST_LOG` is unset or invalid. Returns `false` if a global subscriber already exists.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_ok()
}
