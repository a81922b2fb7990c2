use tracing_subscriber::{EnvFilter, fmt};

/// Initialise the logging subsystem.
///
/// The level is controlled through `RUST_LOG` and defaults to `info`:
/// - `RUST_LOG=debug` also prints full response bodies
/// - `RUST_LOG=apicheck::db=trace` narrows output to the database gateway
///
/// Calling this more than once is harmless; only the first subscriber is installed.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(false)
        .with_line_number(false)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Logger initialized");
    }
}
