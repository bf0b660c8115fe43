use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::runtime::Runtime;

/// Store root used when neither `--root` nor `PKGFOLD_ROOT` is given.
#[tracing::instrument(skip(runtime))]
pub fn default_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let cwd = runtime
        .current_dir()
        .context("Could not determine current directory")?;
    Ok(cwd.join("packages"))
}
