//! Module-gated logging for the keypad pipeline.
//!
//! Each module that wants chatty logs declares `const ENABLE_LOGS: bool` and
//! imports the macros from the crate root:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! use crate::{log_debug, log_info};
//!
//! log_info!("keypad resolved with {} keys", 10);
//! ```
//!
//! Errors that abort an attempt are always logged through `log::error!`
//! directly; these macros are only for progress and diagnostics.

use env_logger::Builder;
use log::LevelFilter;

/// Initialise `env_logger` once. `RUST_LOG` overrides the `Info` default.
pub fn init_logging() {
    let _ = Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();
}

#[doc(hidden)]
#[macro_export]
macro_rules! __gated_log {
    ($level:ident, $($arg:tt)*) => {
        if ENABLE_LOGS {
            log::$level!($($arg)*);
        }
    };
}

/// `log::info!` behind the calling module's `ENABLE_LOGS` flag.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::__gated_log!(info, $($arg)*) };
}

/// `log::warn!` behind the calling module's `ENABLE_LOGS` flag.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::__gated_log!(warn, $($arg)*) };
}

/// `log::debug!` behind the calling module's `ENABLE_LOGS` flag.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::__gated_log!(debug, $($arg)*) };
}
