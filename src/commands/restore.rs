use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

use crate::runtime::Runtime;
use crate::settings::{
    FrameworkSettings, MachineWideSettings, RestoreSettings, RestoreSettingsRequest,
    RestoreSettingsResolver,
};

/// Resolve restore settings for a project.
///
/// `per_framework_file` is a JSON array of `{"name", "metadata"}` items that
/// replaces any items already on the request.
#[tracing::instrument(skip(runtime, machine_wide, request))]
pub fn restore_settings<R: Runtime>(
    runtime: &R,
    machine_wide: &dyn MachineWideSettings,
    mut request: RestoreSettingsRequest,
    per_framework_file: Option<&Path>,
) -> Result<RestoreSettings> {
    if let Some(path) = per_framework_file {
        let content = runtime.read_to_string(path)?;
        request.per_framework = serde_json::from_str::<Vec<FrameworkSettings>>(&content)
            .with_context(|| format!("Failed to parse per-framework settings {:?}", path))?;
        debug!(
            "Loaded {} per-framework item(s) from {:?}",
            request.per_framework.len(),
            path
        );
    }

    RestoreSettingsResolver::new(runtime, machine_wide).resolve(&request)
}
