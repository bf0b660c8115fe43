mod console;
mod package;
mod paths;
mod restore;

pub use console::ConsoleContext;
pub use package::{exists, install, uninstall};
pub use paths::default_root;
pub use restore::restore_settings;
