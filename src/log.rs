//! File logger for medq.
//!
//! The TUI owns the terminal, so every line goes to `~/.medq/medq.log`,
//! truncated when the process starts. Levels:
//! - ERROR: the app or a headless command is about to fail
//! - WARN: a query failed or something recoverable went wrong
//! - INFO: startup and query outcomes
//! - DEBUG: every message and command through the logic thread
//! - TRACE: per-frame state snapshots
//!
//! `--debug` selects DEBUG. `MEDQ_DEBUG=1` (or `true`, `debug`) does the
//! same, and `MEDQ_DEBUG=trace` goes one level further.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use chrono::{DateTime, Local};

pub const DEBUG_ENV: &str = "MEDQ_DEBUG";
const LOG_FILE: &str = "medq.log";

static SINK: OnceLock<PathBuf> = OnceLock::new();
static MAX_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    fn from_repr(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        })
    }
}

impl FromStr for LogLevel {
    type Err = ();

    /// Accepts level names plus the boolean spellings of "debug on".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" | "0" | "false" => Ok(LogLevel::Info),
            "debug" | "1" | "true" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(()),
        }
    }
}

/// Resolve the max level from the `--debug` flag and `MEDQ_DEBUG`.
/// The flag raises the level to at least DEBUG; it never lowers it.
pub fn level_for(debug_flag: bool, env: Option<&str>) -> LogLevel {
    let from_env = env
        .and_then(|v| v.parse::<LogLevel>().ok())
        .unwrap_or(LogLevel::Info);
    if debug_flag {
        from_env.max(LogLevel::Debug)
    } else {
        from_env
    }
}

/// Set the level and truncate the log file. Call once, before any thread starts.
pub fn init(debug_flag: bool) {
    let env = std::env::var(DEBUG_ENV).ok();
    let level = level_for(debug_flag, env.as_deref());
    MAX_LEVEL.store(level as u8, Ordering::SeqCst);

    if let Ok(dir) = crate::config::Config::medq_dir() {
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join(LOG_FILE);
        let _ = std::fs::write(&path, "");
        let _ = SINK.set(path);
    }
}

pub fn max_level() -> LogLevel {
    LogLevel::from_repr(MAX_LEVEL.load(Ordering::Relaxed))
}

pub fn enabled(level: LogLevel) -> bool {
    level <= max_level()
}

fn format_line(at: DateTime<Local>, level: LogLevel, args: fmt::Arguments<'_>) -> String {
    format!("[{}] [{:<5}] {}", at.format("%H:%M:%S%.3f"), level, args)
}

/// Append one line. A no-op before `init` or when the level is filtered.
pub fn write(level: LogLevel, args: fmt::Arguments<'_>) {
    if !enabled(level) {
        return;
    }
    let Some(path) = SINK.get() else { return };
    if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
        let _ = writeln!(file, "{}", format_line(Local::now(), level, args));
    }
}

#[macro_export]
macro_rules! qlog {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Info, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! qlog_error {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Error, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! qlog_warn {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Warn, format_args!($($arg)*))
    };
}

/// Arguments are only formatted when DEBUG is enabled.
#[macro_export]
macro_rules! qlog_debug {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Debug, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! qlog_trace {
    ($($arg:tt)*) => {
        $crate::log::write($crate::log::LogLevel::Trace, format_args!($($arg)*))
    };
}
