//! Mapping from package identity to its location inside a store root.

use std::path::{Path, PathBuf};

use super::PackageIdentity;

/// Extension of the canonical package file.
pub const PACKAGE_EXTENSION: &str = ".nupkg";

/// Pure mapping from identity to install directory and canonical file name.
pub trait PackagePathResolver: Send + Sync {
    fn root(&self) -> &Path;

    /// Directory the package is extracted into.
    fn install_path(&self, identity: &PackageIdentity) -> PathBuf;

    /// File name of the canonical package file inside [`install_path`].
    ///
    /// [`install_path`]: PackagePathResolver::install_path
    fn package_file_name(&self, identity: &PackageIdentity) -> String;

    /// Full path of the canonical package file.
    fn package_file_path(&self, identity: &PackageIdentity) -> PathBuf {
        self.install_path(identity)
            .join(self.package_file_name(identity))
    }
}

/// Resolver for a flat packages folder.
///
/// Side-by-side layout (the default) keeps every version in its own
/// directory: `<root>/<name>.<version>/<name>.<version>.nupkg`. Without it the
/// directory is just `<root>/<name>`. The name is always lowercased so
/// identities that compare equal land on the same path on case-sensitive
/// filesystems.
#[derive(Debug, Clone)]
pub struct FolderPathResolver {
    root: PathBuf,
    side_by_side: bool,
}

impl FolderPathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            side_by_side: true,
        }
    }

    pub fn with_side_by_side(mut self, side_by_side: bool) -> Self {
        self.side_by_side = side_by_side;
        self
    }

    fn directory_name(&self, identity: &PackageIdentity) -> String {
        if self.side_by_side {
            format!("{}.{}", identity.folded_name(), identity.version())
        } else {
            identity.folded_name()
        }
    }
}

impl PackagePathResolver for FolderPathResolver {
    fn root(&self) -> &Path {
        &self.root
    }

    fn install_path(&self, identity: &PackageIdentity) -> PathBuf {
        self.root.join(self.directory_name(identity))
    }

    fn package_file_name(&self, identity: &PackageIdentity) -> String {
        format!(
            "{}.{}{}",
            identity.folded_name(),
            identity.version(),
            PACKAGE_EXTENSION
        )
    }
}
