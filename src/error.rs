use std::path::PathBuf;
use thiserror::Error;

/// Typed failures raised by this crate.
///
/// Everything else (filesystem, archive) travels as an `anyhow::Error` with
/// the original source kept in the chain.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument '{param}': {reason}")]
    InvalidArgument { param: &'static str, reason: String },

    #[error("'{input}' is not a valid package version")]
    InvalidVersion { input: String },

    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {path:?} does not exist")]
    ConfigNotFound { path: PathBuf },
}

impl Error {
    pub fn invalid_argument(param: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            param,
            reason: reason.into(),
        }
    }
}
