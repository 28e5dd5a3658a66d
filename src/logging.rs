use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. Filter comes from `RUST_LOG`, default `warn`
/// so the terminal dashboard is not painted over.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
