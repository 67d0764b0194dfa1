use tracing_subscriber::EnvFilter;

/// Initialize structured logging with tracing-subscriber.
///
/// `--silent` pins the filter to `error`. Otherwise `RUST_LOG` wins over the
/// provided level.
pub fn init(log_level: &str, silent: bool) {
    let env_filter = if silent {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();
}
