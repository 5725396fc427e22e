//! Logging facility
//!
//! Provides logging for the simulator using the `log` crate. Records go to
//! stderr so they never interleave with command output on stdout.

use log::{LevelFilter, Log, Metadata, Record};
use spin::Mutex;

/// Global logger instance available throughout the crate
pub static LOGGER: Logger = Logger::new();

/// Logger that serializes its output section
pub struct Logger {
    inner: Mutex<()>,
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Creates a new logger instance
    pub const fn new() -> Logger {
        Logger {
            inner: Mutex::new(()),
        }
    }
}

impl Log for Logger {
    /// Determines if a log message should be processed based on its level
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    /// Processes and outputs a log record
    ///
    /// Formats messages as "[LEVEL] message"
    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _guard = self.inner.lock();
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    /// Flush buffered logs (no-op in this implementation)
    fn flush(&self) {}
}

/// Initializes the logging system
///
/// # Notes
/// * Sets different log levels for debug/release builds:
///   - Debug builds: LevelFilter::Debug
///   - Release builds: LevelFilter::Info
pub fn init() {
    log::set_logger(&LOGGER)
        .map(|()| {
            log::set_max_level(
                #[cfg(debug_assertions)]
                LevelFilter::Debug,
                #[cfg(not(debug_assertions))]
                LevelFilter::Info,
            )
        })
        .expect("Logger initialization failed");
}
