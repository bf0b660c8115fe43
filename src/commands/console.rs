use std::io::{self, Write};

use crate::store::{MessageLevel, ProjectContext};

/// Prints store notifications for a terminal user.
///
/// Info lines go to stdout; warnings and errors go to stderr so scripts can
/// keep parsing stdout. Write failures such as a closed pipe are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleContext;

impl ConsoleContext {
    fn write_line(out: &mut dyn Write, level: MessageLevel, message: &str) {
        let result = match level {
            MessageLevel::Info => writeln!(out, "{}", message),
            MessageLevel::Warning => writeln!(out, "Warning: {}", message),
            MessageLevel::Error => writeln!(out, "Error: {}", message),
        };
        if let Err(err) = result {
            log::debug!("Dropped {} message: {}", level, err);
        }
    }
}

impl ProjectContext for ConsoleContext {
    fn log(&self, level: MessageLevel, message: &str) {
        log::debug!("[{}] {}", level, message);
        match level {
            MessageLevel::Info => Self::write_line(&mut io::stdout().lock(), level, message),
            _ => Self::write_line(&mut io::stderr().lock(), level, message),
        }
    }
}
