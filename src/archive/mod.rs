mod nupkg;

use crate::package::{PackageIdentity, PackagePathResolver};
use crate::runtime::Runtime;
use anyhow::Result;
use std::io::{Read, Seek};
use std::path::PathBuf;

pub use nupkg::ZipPackageExtractor;

/// What an extraction leaves behind in the install directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SaveMode {
    /// Only the canonical package file.
    #[default]
    #[value(name = "archive")]
    ArchiveOnly,
    /// The canonical package file plus the unpacked contents.
    #[value(name = "archive-and-files")]
    ArchiveAndFiles,
    /// Only the unpacked contents. Such a package never counts as installed.
    #[value(name = "files")]
    FilesOnly,
}

impl SaveMode {
    pub fn saves_archive(self) -> bool {
        matches!(self, SaveMode::ArchiveOnly | SaveMode::ArchiveAndFiles)
    }

    pub fn extracts_files(self) -> bool {
        matches!(self, SaveMode::FilesOnly | SaveMode::ArchiveAndFiles)
    }
}

/// Unpacks a package stream into the location the resolver picks for it.
pub trait PackageExtractor: Send + Sync {
    /// Returns every file written.
    fn extract<R: Runtime, S: Read + Seek>(
        &self,
        runtime: &R,
        stream: &mut S,
        identity: &PackageIdentity,
        resolver: &dyn PackagePathResolver,
        save_mode: SaveMode,
    ) -> Result<Vec<PathBuf>>;
}
