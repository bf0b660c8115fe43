use anyhow::Result;
use log::debug;
use std::path::{Path, PathBuf};

use crate::archive::SaveMode;
use crate::package::PackageIdentity;
use crate::runtime::Runtime;
use crate::store::{FolderPackageStore, ProjectContext};

use super::paths::default_root;

fn open_store<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<FolderPackageStore<'_, R>> {
    let root = match root {
        Some(path) => path,
        None => default_root(runtime)?,
    };
    debug!("Using store root: {:?}", root);
    FolderPackageStore::new(runtime, root)
}

/// Install the archive at `archive` as `id` `version`.
///
/// Returns whether anything was written; an existing package is a warning.
#[tracing::instrument(skip(runtime, context))]
pub fn install<R: Runtime>(
    runtime: &R,
    root: Option<PathBuf>,
    id: &str,
    version: &str,
    archive: &Path,
    save_mode: SaveMode,
    context: &dyn ProjectContext,
) -> Result<bool> {
    let identity = PackageIdentity::parse(id, version)?;
    let store = open_store(runtime, root)?.with_save_mode(save_mode);
    let mut stream = runtime.open_file(archive)?;
    store.install(&identity, &mut stream, context)
}

#[tracing::instrument(skip(runtime, context))]
pub fn uninstall<R: Runtime>(
    runtime: &R,
    root: Option<PathBuf>,
    id: &str,
    version: &str,
    context: &dyn ProjectContext,
) -> Result<bool> {
    let identity = PackageIdentity::parse(id, version)?;
    open_store(runtime, root)?.uninstall(&identity, context)
}

#[tracing::instrument(skip(runtime))]
pub fn exists<R: Runtime>(
    runtime: &R,
    root: Option<PathBuf>,
    id: &str,
    version: &str,
) -> Result<bool> {
    let identity = PackageIdentity::parse(id, version)?;
    Ok(open_store(runtime, root)?.package_exists(&identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::runtime::RealRuntime;
    use crate::store::LogContext;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::{FileOptions, ZipWriter};

    fn write_archive(path: &Path) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        zip.start_file("lib/readme.txt", FileOptions::<()>::default())
            .unwrap();
        zip.write_all(b"hello").unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_install_exists_uninstall() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("Foo.1.0.0.nupkg");
        write_archive(&archive);
        let root = Some(dir.path().join("packages"));

        assert!(!exists(&RealRuntime, root.clone(), "Foo", "1.0.0").unwrap());
        assert!(
            install(
                &RealRuntime,
                root.clone(),
                "Foo",
                "1.0",
                &archive,
                SaveMode::ArchiveAndFiles,
                &LogContext,
            )
            .unwrap()
        );
        assert!(exists(&RealRuntime, root.clone(), "foo", "1.0.0").unwrap());
        assert!(
            dir.path()
                .join("packages/foo.1.0.0/lib/readme.txt")
                .is_file()
        );

        assert!(uninstall(&RealRuntime, root.clone(), "FOO", "1.0.0", &LogContext).unwrap());
        assert!(!exists(&RealRuntime, root, "Foo", "1.0.0").unwrap());
    }

    #[test]
    fn test_missing_archive_fails_before_touching_store() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("packages");

        let result = install(
            &RealRuntime,
            Some(root.clone()),
            "Foo",
            "1.0.0",
            &dir.path().join("missing.nupkg"),
            SaveMode::default(),
            &LogContext,
        );
        assert!(result.is_err());
        assert!(!root.exists());
    }

    #[test]
    fn test_invalid_identity_is_rejected() {
        let dir = tempdir().unwrap();
        let err = exists(&RealRuntime, Some(dir.path().to_path_buf()), "../evil", "1.0.0")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidArgument { .. })
        ));

        let err =
            exists(&RealRuntime, Some(dir.path().to_path_buf()), "Foo", "one").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidVersion { .. })
        ));
    }
}
