use crate::package::{PackageIdentity, PackagePathResolver};
use crate::runtime::Runtime;
use anyhow::{Context, Result};
use log::{debug, info};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use zip::ZipArchive;

use super::{PackageExtractor, SaveMode};

/// Extractor for zip-based `.nupkg` packages.
pub struct ZipPackageExtractor;

/// OPC bookkeeping entries every package carries; never unpacked.
fn is_packaging_metadata(entry_path: &Path) -> bool {
    match entry_path.components().next() {
        Some(Component::Normal(first)) => {
            let first = first.to_string_lossy();
            first == "[Content_Types].xml" || first == "_rels" || first == "package"
        }
        _ => true,
    }
}

/// Sibling path the canonical file is staged at before it is renamed into place.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Copy `stream` to `dest` so that `dest` is either complete or absent.
fn write_atomically<R: Runtime, S: Read>(runtime: &R, stream: &mut S, dest: &Path) -> Result<()> {
    let staging = staging_path(dest);
    let copied = runtime.create_file(&staging).and_then(|mut file| {
        io::copy(stream, &mut file)
            .with_context(|| format!("Failed to write package file {:?}", dest))?;
        file.flush()?;
        Ok(())
    });
    if let Err(err) = copied {
        if let Err(cleanup) = runtime.remove_file(&staging) {
            debug!("Could not remove {:?}: {:#}", staging, cleanup);
        }
        return Err(err);
    }
    runtime.rename(&staging, dest)
}

impl PackageExtractor for ZipPackageExtractor {
    #[tracing::instrument(skip(self, runtime, stream, resolver))]
    fn extract<R: Runtime, S: Read + Seek>(
        &self,
        runtime: &R,
        stream: &mut S,
        identity: &PackageIdentity,
        resolver: &dyn PackagePathResolver,
        save_mode: SaveMode,
    ) -> Result<Vec<PathBuf>> {
        let install_path = resolver.install_path(identity);
        let package_file = resolver.package_file_path(identity);
        let mut written = Vec::new();

        // Parse before touching the disk so a corrupt package leaves nothing behind.
        stream.seek(SeekFrom::Start(0))?;
        let mut archive = ZipArchive::new(&mut *stream)
            .with_context(|| format!("Failed to read package archive for {}", identity))?;

        runtime.create_dir_all(&install_path)?;

        if save_mode.extracts_files() {
            debug!("Unpacking {} entries to {:?}", archive.len(), install_path);
            for i in 0..archive.len() {
                let mut entry = archive
                    .by_index(i)
                    .with_context(|| format!("Failed to read package entry {}", i))?;

                let entry_path = match entry.enclosed_name() {
                    Some(path) => path.to_path_buf(),
                    None => {
                        debug!("Skipping entry with invalid path: {}", entry.name());
                        continue;
                    }
                };

                if entry.is_dir() || is_packaging_metadata(&entry_path) {
                    continue;
                }

                let full_path = install_path.join(&entry_path);
                if full_path == package_file {
                    continue;
                }
                if let Some(parent) = full_path.parent() {
                    runtime.create_dir_all(parent)?;
                }
                let mut dest_file = runtime.create_file(&full_path)?;
                io::copy(&mut entry, &mut dest_file)
                    .with_context(|| format!("Failed to extract file {:?}", full_path))?;
                written.push(full_path);
            }
        }
        drop(archive);

        // The canonical file goes last: until it exists the package is not installed.
        if save_mode.saves_archive() {
            stream.seek(SeekFrom::Start(0))?;
            write_atomically(runtime, stream, &package_file)?;
            written.push(package_file);
        }

        info!("Extracted {} ({} files)", identity, written.len());
        Ok(written)
    }
}
