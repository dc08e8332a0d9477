#![deny(missing_docs)]
//! Shared logging utilities for the listsweep workspace.
//!
//! The `sweep_*` macros forward to the `log` facade through a re-export held
//! by this crate, so library crates log without depending on `log`
//! themselves and every message is tagged with the `listsweep` target unless
//! the call site names its own. Front ends pick the backend (`simplelog`) and
//! the level; [`level_for_verbosity`] maps `-v` counts to that level and
//! [`initialize_for_tests`] installs a terminal logger for tests.

use log::LevelFilter;

#[doc(hidden)]
pub use log as __log;

/// Target attached to messages logged through the `sweep_*` macros.
pub const TARGET: &str = "listsweep";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! sweep_trace {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::__log::trace!(target: $target, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        $crate::__log::trace!(target: $crate::TARGET, $($arg)+);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! sweep_info {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::__log::info!(target: $target, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        $crate::__log::info!(target: $crate::TARGET, $($arg)+);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! sweep_debug {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::__log::debug!(target: $target, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        $crate::__log::debug!(target: $crate::TARGET, $($arg)+);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! sweep_warn {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::__log::warn!(target: $target, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        $crate::__log::warn!(target: $crate::TARGET, $($arg)+);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! sweep_error {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::__log::error!(target: $target, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        $crate::__log::error!(target: $crate::TARGET, $($arg)+);
    }};
}

/// Maps a repeated `-v` count to a level filter.
///
/// Zero yields `Info`, one `Debug`, anything higher `Trace`.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_increasing_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Info);
        assert_eq!(level_for_verbosity(1), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(7), LevelFilter::Trace);
    }
}
