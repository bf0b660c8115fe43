//! Folder-backed package store.
//!
//! A package counts as installed in a folder when its canonical file
//! (`<root>/<name>.<version>/<name>.<version>.nupkg`) exists. Nothing is
//! cached in memory: every check goes back to the filesystem.

mod context;
mod lock;

use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::archive::{PackageExtractor, SaveMode, ZipPackageExtractor};
use crate::error::Error;
use crate::package::{FolderPathResolver, PackageIdentity, PackagePathResolver, PackageReference};
use crate::runtime::Runtime;

pub use context::{LogContext, MessageLevel, ProjectContext};

#[cfg(test)]
pub use context::MockProjectContext;

/// A packages folder such as a solution's `packages/` directory.
pub struct FolderPackageStore<'a, R: Runtime, E: PackageExtractor = ZipPackageExtractor> {
    runtime: &'a R,
    resolver: FolderPathResolver,
    extractor: E,
    save_mode: SaveMode,
}

impl<'a, R: Runtime> FolderPackageStore<'a, R, ZipPackageExtractor> {
    /// Create a store rooted at `root`.
    ///
    /// A relative root is resolved against the current directory once, here;
    /// the root never changes afterwards.
    pub fn new(runtime: &'a R, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(Error::invalid_argument("root", "store root must not be empty").into());
        }
        let root = if root.is_absolute() {
            root
        } else {
            runtime.current_dir()?.join(root)
        };

        Ok(Self {
            runtime,
            resolver: FolderPathResolver::new(root),
            extractor: ZipPackageExtractor,
            save_mode: SaveMode::default(),
        })
    }
}

impl<'a, R: Runtime, E: PackageExtractor> FolderPackageStore<'a, R, E> {
    pub fn with_save_mode(mut self, save_mode: SaveMode) -> Self {
        self.save_mode = save_mode;
        self
    }

    /// Keep every version in its own directory (default) or one directory per name.
    pub fn with_side_by_side(mut self, side_by_side: bool) -> Self {
        self.resolver = self.resolver.with_side_by_side(side_by_side);
        self
    }

    pub fn with_extractor<E2: PackageExtractor>(self, extractor: E2) -> FolderPackageStore<'a, R, E2> {
        FolderPackageStore {
            runtime: self.runtime,
            resolver: self.resolver,
            extractor,
            save_mode: self.save_mode,
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn resolver(&self) -> &FolderPathResolver {
        &self.resolver
    }

    pub fn save_mode(&self) -> SaveMode {
        self.save_mode
    }

    /// Folder stores keep no per-project reference list.
    pub fn installed_packages(&self) -> Vec<PackageReference> {
        Vec::new()
    }

    /// True when the canonical package file is present. A directory without
    /// it (for example a half-finished extraction) does not count.
    pub fn package_exists(&self, identity: &PackageIdentity) -> bool {
        self.runtime
            .is_file(&self.resolver.package_file_path(identity))
    }

    /// Extract `stream` into the folder.
    ///
    /// Returns `Ok(false)` with a warning when the package is already present.
    /// Extractor failures are returned as-is; nothing is cleaned up.
    #[tracing::instrument(skip(self, stream, context))]
    pub fn install<S: Read + Seek>(
        &self,
        identity: &PackageIdentity,
        stream: &mut S,
        context: &dyn ProjectContext,
    ) -> Result<bool> {
        let install_path = self.resolver.install_path(identity);
        lock::with_install_path_lock(&install_path, || {
            if self.package_exists(identity) {
                context.log(
                    MessageLevel::Warning,
                    &format!(
                        "Package '{}' already exists in folder '{}'",
                        identity,
                        self.root().display()
                    ),
                );
                return Ok(false);
            }

            context.log(
                MessageLevel::Info,
                &format!(
                    "Adding package '{}' to folder '{}'",
                    identity,
                    self.root().display()
                ),
            );

            stream.seek(SeekFrom::Start(0))?;
            let written = self.extractor.extract(
                self.runtime,
                stream,
                identity,
                &self.resolver,
                self.save_mode,
            )?;
            debug!("Wrote {} file(s) under {:?}", written.len(), install_path);

            context.log(
                MessageLevel::Info,
                &format!(
                    "Added package '{}' to folder '{}'",
                    identity,
                    self.root().display()
                ),
            );
            Ok(true)
        })
    }

    /// Delete the package's install directory.
    ///
    /// Returns `Ok(false)` with a warning when the package is not present.
    /// A failed delete (e.g. permission denied) is returned with the
    /// `io::Error` still reachable through `downcast_ref`.
    #[tracing::instrument(skip(self, context))]
    pub fn uninstall(&self, identity: &PackageIdentity, context: &dyn ProjectContext) -> Result<bool> {
        let install_path = self.resolver.install_path(identity);
        lock::with_install_path_lock(&install_path, || {
            if !self.package_exists(identity) {
                context.log(
                    MessageLevel::Warning,
                    &format!(
                        "Package '{}' does not exist in folder '{}'",
                        identity,
                        self.root().display()
                    ),
                );
                return Ok(false);
            }

            context.log(
                MessageLevel::Info,
                &format!(
                    "Removing package '{}' from folder '{}'",
                    identity,
                    self.root().display()
                ),
            );

            self.runtime
                .remove_dir_all(&install_path)
                .with_context(|| format!("Failed to remove {:?}", install_path))?;

            context.log(
                MessageLevel::Info,
                &format!(
                    "Removed package '{}' from folder '{}'",
                    identity,
                    self.root().display()
                ),
            );
            Ok(true)
        })
    }
}
