use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::Error;

use super::PackageVersion;

/// A package name plus version.
///
/// Names compare case-insensitively, so `Newtonsoft.Json 13.0.1` and
/// `newtonsoft.json 13.0.1` are the same identity. Versions compare exactly.
/// The name keeps the casing it was created with for display; on disk the
/// lowercased [`PackageIdentity::folded_name`] is used.
#[derive(Debug, Clone)]
pub struct PackageIdentity {
    name: String,
    version: PackageVersion,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: PackageVersion) -> Result<Self, Error> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { name, version })
    }

    /// Build an identity from a name and an unparsed version string.
    pub fn parse(name: impl Into<String>, version: &str) -> Result<Self, Error> {
        Self::new(name, version.parse()?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &PackageVersion {
        &self.version
    }

    /// Lowercased name; equal identities always share it.
    pub fn folded_name(&self) -> String {
        self.name.to_lowercase()
    }
}

fn validate_name(name: &str) -> Result<(), Error> {
    if name.trim().is_empty() {
        return Err(Error::invalid_argument(
            "identity",
            "package name must not be empty",
        ));
    }
    if name == "." || name == ".." {
        return Err(Error::invalid_argument(
            "identity",
            format!("'{}' is not a valid package name", name),
        ));
    }
    if name
        .chars()
        .any(|c| c == '/' || c == '\\' || c.is_control() || c.is_whitespace())
    {
        return Err(Error::invalid_argument(
            "identity",
            format!("package name '{}' contains invalid characters", name),
        ));
    }
    Ok(())
}

impl PartialEq for PackageIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.folded_name() == other.folded_name() && self.version == other.version
    }
}

impl Eq for PackageIdentity {}

impl Hash for PackageIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded_name().hash(state);
        self.version.hash(state);
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}
