pub mod archive;
pub mod commands;
pub mod error;
pub mod package;
pub mod runtime;
pub mod settings;
pub mod store;

pub use error::Error;
