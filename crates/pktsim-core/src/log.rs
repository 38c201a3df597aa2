//! Logging facilities.
//!
//! Every record is prefixed with the simulation time, the colored level and the name of the emitting
//! component, which is also used as the log target. This allows filtering the output of a single node,
//! e.g. `RUST_LOG=Node3=trace`.

use atty::Stream;
use colored::{Color, ColoredString, Colorize};
use log::error;
use serde_json::json;

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

/// Logs a message at the info level.
///
/// The first two arguments are the current simulation time and the component name.
///
/// # Examples
///
/// ```rust
/// use std::io::Write;
/// use env_logger::Builder;
/// use pktsim_core::log_info;
///
/// // configure env_logger
/// Builder::from_default_env()
///     .format(|buf, record| writeln!(buf, "{}", record.args()))
///     .init();
///
/// log_info!(0.5, "Node0", "generated packet {}", 7);
/// ```
#[macro_export]
macro_rules! log_info {
    ($time:expr, $name:expr, $msg:expr) => (
        log::info!(
            target: $name,
            "[{:.3} {}  {}] {}",
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::info!(
            target: $name,
            concat!("[{:.3} {}  {}] ", $format),
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $($arg)+
        )
    );
}

/// Logs a message at the debug level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_debug {
    ($time:expr, $name:expr, $msg:expr) => (
        log::debug!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::debug!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $($arg)+
        )
    );
}

/// Logs a message at the trace level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_trace {
    ($time:expr, $name:expr, $msg:expr) => (
        log::trace!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::trace!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $($arg)+
        )
    );
}

/// Logs a message at the warn level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_warn {
    ($time:expr, $name:expr, $msg:expr) => (
        log::warn!(
            target: $name,
            "[{:.3} {}  {}] {}",
            $time, $crate::log::get_colored("WARN", $crate::colored::Color::Yellow), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::warn!(
            target: $name,
            concat!("[{:.3} {}  {}] ", $format),
            $time, $crate::log::get_colored("WARN", $crate::colored::Color::Yellow), $name, $($arg)+
        )
    );
}

/// Logs a message at the error level.
///
/// # Examples
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_error {
    ($time:expr, $name:expr, $msg:expr) => (
        log::error!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("ERROR", $crate::colored::Color::Red), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::error!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("ERROR", $crate::colored::Color::Red), $name, $($arg)+
        )
    );
}

/// Logs an event which was rejected by the scheduler.
pub(crate) fn log_incorrect_event(id: u64, time: f64, clock: f64, msg: &str) {
    error!(
        target: "simulation",
        "[{:.3} {} simulation] Incorrect event ({}): {}",
        clock,
        get_colored("ERROR", Color::Red),
        msg,
        json!({"id": id, "time": time})
    );
}
