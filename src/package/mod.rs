//! Package identities and their on-disk locations.

mod identity;
mod path_resolver;
mod version;

pub use identity::PackageIdentity;
pub use path_resolver::{FolderPathResolver, PACKAGE_EXTENSION, PackagePathResolver};
pub use version::PackageVersion;

/// A package referenced by a project, optionally scoped to a target framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReference {
    pub identity: PackageIdentity,
    pub target_framework: Option<String>,
}

impl PackageReference {
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            identity,
            target_framework: None,
        }
    }
}
