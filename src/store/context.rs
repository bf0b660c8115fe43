//! Notification sink handed to store operations.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        f.write_str(name)
    }
}

/// Receives progress and warning messages from store operations.
///
/// Implementations must not fail; a sink that cannot deliver a message drops it.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectContext: Send + Sync {
    fn log(&self, level: MessageLevel, message: &str);
}

/// Forwards every message to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogContext;

impl ProjectContext for LogContext {
    fn log(&self, level: MessageLevel, message: &str) {
        match level {
            MessageLevel::Info => log::info!("{}", message),
            MessageLevel::Warning => log::warn!("{}", message),
            MessageLevel::Error => log::error!("{}", message),
        }
    }
}
