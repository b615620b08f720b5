//! tracing subscriber setup

use tracing_subscriber::EnvFilter;

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
pub fn init(verbose: bool) {
    let default = if verbose { "vidsweep=info" } else { "vidsweep=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
