use std::io::Write;

use env_logger::Env;

/// Default filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Set up the global logger. Level can be overridden with RUST_LOG.
/// Calling this more than once is harmless; later calls are ignored.
pub fn setup_global_logger() {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .try_init();
}
