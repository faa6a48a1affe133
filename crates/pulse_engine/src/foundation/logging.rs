//! Logging initialization
//!
//! Library code logs through the `log` macros only; binaries and tests pick
//! the backend here.

/// Initialize `env_logger` with a default level, overridable through `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Initialize logging for unit tests so output goes through the test harness
pub fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .parse_default_env()
        .is_test(true)
        .try_init();
}
