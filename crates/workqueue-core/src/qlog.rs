//! Leveled stderr logging for the workqueue
//!
//! Thread-safe, optionally-flushing debug output. Worker threads and the
//! main thread can interleave log lines; each line is written under the
//! stderr lock so it comes out whole.
//!
//! # Environment Variables
//!
//! - `WQ_LOG_LEVEL=<level>` - 0=off, 1=error, 2=warn, 3=info, 4=debug, 5=trace
//! - `WQ_FLUSH_EPRINT=1` - Flush stderr after each line (debugging crashes)
//!
//! # Usage
//!
//! ```ignore
//! use workqueue_core::{qdebug, qinfo, qwarn};
//!
//! qinfo!("pool started with {} workers", n);
//! qdebug!("worker {} picked up {}", id, entry_id);
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::env::{env_get, env_get_bool};

/// Log levels
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Off => "",
            LogLevel::Error => "[ERROR]",
            LogLevel::Warn => "[WARN] ",
            LogLevel::Info => "[INFO] ",
            LogLevel::Debug => "[DEBUG]",
            LogLevel::Trace => "[TRACE]",
        }
    }
}

static FLUSH_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Warn as u8);
static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Initialize logging from environment variables
///
/// Called automatically on first log; call explicitly for deterministic
/// startup.
pub fn init() {
    if INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }
    FLUSH_ENABLED.store(env_get_bool("WQ_FLUSH_EPRINT", false), Ordering::Relaxed);
    let level: u8 = env_get("WQ_LOG_LEVEL", LogLevel::Warn as u8);
    LOG_LEVEL.store(level, Ordering::Relaxed);
}

/// Get current log level
#[inline]
pub fn log_level() -> LogLevel {
    if !INITIALIZED.load(Ordering::Relaxed) {
        init();
    }
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set log level programmatically
pub fn set_log_level(level: LogLevel) {
    INITIALIZED.store(true, Ordering::SeqCst);
    LOG_LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Check if a log level is enabled
#[inline]
pub fn level_enabled(level: LogLevel) -> bool {
    level as u8 <= log_level() as u8
}

/// Internal: leveled line write under the stderr lock
#[doc(hidden)]
pub fn _qlog_impl(level: LogLevel, args: std::fmt::Arguments<'_>) {
    if !level_enabled(level) {
        return;
    }
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = write!(handle, "{} ", level.prefix());
    let _ = handle.write_fmt(args);
    let _ = handle.write_all(b"\n");
    if FLUSH_ENABLED.load(Ordering::Relaxed) {
        let _ = handle.flush();
    }
}

/// Error level log
#[macro_export]
macro_rules! qerror {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl(
            $crate::qlog::LogLevel::Error,
            format_args!($($arg)*)
        );
    }};
}

/// Warning level log
#[macro_export]
macro_rules! qwarn {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl(
            $crate::qlog::LogLevel::Warn,
            format_args!($($arg)*)
        );
    }};
}

/// Info level log
#[macro_export]
macro_rules! qinfo {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl(
            $crate::qlog::LogLevel::Info,
            format_args!($($arg)*)
        );
    }};
}

/// Debug level log
#[macro_export]
macro_rules! qdebug {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl(
            $crate::qlog::LogLevel::Debug,
            format_args!($($arg)*)
        );
    }};
}

/// Trace level log (most verbose)
#[macro_export]
macro_rules! qtrace {
    ($($arg:tt)*) => {{
        $crate::qlog::_qlog_impl(
            $crate::qlog::LogLevel::Trace,
            format_args!($($arg)*)
        );
    }};
}
