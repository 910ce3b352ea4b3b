#![deny(missing_docs)]
//! Logging macros shared by the clipdeck crates.
//!
//! Every crate logs through the `engine_*` macros so the backend can be
//! swapped in one place. Binaries install a logger at startup; tests call
//! [`initialize_for_tests`].

/// Logs at trace level.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs at debug level.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs at info level.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs at warn level.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs at error level.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Level used by [`initialize_for_tests`]: debug in debug builds, info otherwise.
pub fn test_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

/// Installs a terminal logger for tests.
///
/// Safe to call from every test; later calls are no-ops.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, TermLogger, TerminalMode};

    let config = ConfigBuilder::new()
        .add_filter_allow_str("clipdeck")
        .build();

    // A logger may already be installed by an earlier test in this binary.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        test_level(),
        config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
