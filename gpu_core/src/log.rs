//! Internal logging system for the GPU core
//!
//! This module provides a flexible logging system with:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - Thread-safe logging with RwLock
//! - File and line information for detailed ERROR logs
//! - Error helpers (`engine_err!`, `engine_bail!`) and contract assertions
//!   (`engine_assert!`, `engine_assert_fail!`)

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Destination of every engine log entry
///
/// Install one with `Engine::set_logger`; the default prints to the console.
///
/// # Example
///
/// ```no_run
/// use gpu_core::gpu::log::{Logger, LogEntry, LogSeverity};
///
/// struct WarningsOnly;
///
/// impl Logger for WarningsOnly {
///     fn log(&self, entry: &LogEntry) {
///         if entry.severity >= LogSeverity::Warn {
///             eprintln!("{}: {}", entry.source, entry.message);
///         }
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

/// One log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Reporting subsystem, e.g. "gpu::PipelineManager"
    pub source: String,
    pub message: String,
    /// Call site, set for errors and contract violations only
    pub file: Option<&'static str>,
    pub line: Option<u32>,
}

/// Log severity levels, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-object lifecycle chatter (slot registration, pipeline creation)
    Trace,
    /// Manager initialization and teardown
    Debug,
    /// Context-level events such as render target rebuilds
    Info,
    /// Recoverable misuse (unregistering live objects, uniform mismatches)
    Warn,
    /// Driver failures and contract violations
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by `DefaultLogger`
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colorize(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Colored console logger
///
/// Prints `[timestamp] [SEVERITY] [source] message`, followed by `(file:line)`
/// when the entry carries a call site. Warnings and errors go to stderr.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let mut line = format!(
            "[{}] [{}] [{}] {}",
            datetime.format("%Y-%m-%d %H:%M:%S%.3f"),
            entry.severity.colorize(),
            entry.source.bright_blue(),
            entry.message
        );
        if let (Some(file), Some(number)) = (entry.file, entry.line) {
            line.push_str(&format!(" ({}:{})", file, number));
        }

        if entry.severity >= LogSeverity::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose, typically disabled)
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_trace;
/// # let id = 0;
/// engine_trace!("gpu::BufferManager", "Slot {} registered", id);
/// ```
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::gpu::Engine::log(
            $crate::gpu::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message (development information)
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_debug;
/// # let id = 0;
/// engine_debug!("gpu::ShaderManager", "Program {:#x} linked", id);
/// ```
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::gpu::Engine::log(
            $crate::gpu::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message (important events)
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_info;
/// # let (w, h) = (0, 0);
/// engine_info!("gpu::RenderTargetManager", "Render targets rebuilt at {}x{}", w, h);
/// ```
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::gpu::Engine::log(
            $crate::gpu::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message (potential issues)
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_warn;
/// # let id = 0;
/// engine_warn!("gpu::BufferManager", "Buffer {} is still valid", id);
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::gpu::Engine::log(
            $crate::gpu::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_error;
/// # let info_log = "";
/// engine_error!("gpu::ShaderManager", "Link failed: {}", info_log);
/// ```
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::gpu::Engine::log_detailed(
            $crate::gpu::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

// ===== ERROR MACROS =====

/// Log an ERROR message and build an `Error::BackendError` from it
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_err;
/// # let name = "";
/// let err = engine_err!("gpu::TextureManager", "Texture '{}' not found", name);
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::gpu::Engine::log_detailed(
            $crate::gpu::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::gpu::Error::BackendError(message)
    }};
}

/// Log an ERROR message and return `Err(Error::BackendError)` from the current function
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_bail;
/// # fn f(name: &str) -> gpu_core::gpu::Result<()> {
/// engine_bail!("gpu::TextureManager", "Texture '{}' already exists", name);
/// # }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

// ===== CONTRACT ASSERTIONS =====

/// Report a contract violation and abort the caller
///
/// Logs an ERROR entry with file:line and panics. Evaluates to `!`, so it can
/// terminate `let ... else` blocks.
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_assert_fail;
/// # struct Ids;
/// # impl Ids { fn alloc(&mut self) -> Option<u32> { None } }
/// # let mut ids = Ids;
/// let Some(raw) = ids.alloc() else {
///     engine_assert_fail!("gpu::BufferManager", "Memory buffer storage overflow");
/// };
/// ```
#[macro_export]
macro_rules! engine_assert_fail {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::gpu::Engine::log_detailed(
            $crate::gpu::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        panic!("[{}] {}", $source, message)
    }};
}

/// Check a contract condition, aborting the caller through `engine_assert_fail!` if it fails
///
/// # Example
///
/// ```no_run
/// # use gpu_core::engine_assert;
/// # struct Buf;
/// # impl Buf { fn is_valid(&self) -> bool { true } }
/// # let (buffer, id) = (Buf, 0);
/// engine_assert!(buffer.is_valid(), "gpu::BufferManager", "Buffer {} is not valid", id);
/// ```
#[macro_export]
macro_rules! engine_assert {
    ($cond:expr, $source:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::engine_assert_fail!($source, $($arg)*);
        }
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
