//! Forwarding of the crate's `log` records to a host-provided sink.

use std::sync::{Arc, OnceLock};

/// Log sink implemented by the host application.
///
/// Register one with [`set_logger`] before opening a session to observe
/// statement cache activity.
///
/// ```rust
/// use prepkit_core::logger::{LogLevel, Logger};
///
/// struct StderrLogger;
///
/// impl Logger for StderrLogger {
///     fn log(&self, level: LogLevel, message: String) {
///         eprintln!("[{level:?}] {message}");
///     }
/// }
/// ```
#[uniffi::export(with_foreign)]
pub trait Logger: Sync + Send {
    /// Receives one formatted record.
    fn log(&self, level: LogLevel, message: String);
}

/// Severity of a forwarded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum LogLevel {
    /// Per-row detail.
    Trace,
    /// Cache activity.
    Debug,
    /// Informational.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures.
    Error,
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug => Self::Debug,
            log::Level::Trace => Self::Trace,
        }
    }
}

static LOGGER_INSTANCE: OnceLock<Arc<dyn Logger>> = OnceLock::new();

struct ForeignLogger;

impl log::Log for ForeignLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        is_forwarded(metadata.level(), metadata.target())
    }

    fn log(&self, record: &log::Record) {
        if !is_forwarded(record.level(), record.module_path().unwrap_or_default()) {
            return;
        }
        if let Some(logger) = LOGGER_INSTANCE.get() {
            logger.log(record.level().into(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Debug and trace records are only forwarded from this crate's modules.
fn is_forwarded(level: log::Level, module: &str) -> bool {
    level <= log::Level::Info || module.starts_with("prepkit")
}

/// Installs `logger` as the destination of every record.
///
/// Only the first call takes effect; later calls are ignored.
#[uniffi::export]
pub fn set_logger(logger: Arc<dyn Logger>) {
    if LOGGER_INSTANCE.set(logger).is_err() {
        return;
    }
    static FORWARDER: ForeignLogger = ForeignLogger;
    if log::set_logger(&FORWARDER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}
