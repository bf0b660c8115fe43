//! Final restore settings for one project.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

use super::aggregate::{
    ADDITIONAL_FALLBACK_FOLDERS, ADDITIONAL_FALLBACK_FOLDERS_EXCLUDES, ADDITIONAL_SOURCES,
    ADDITIONAL_SOURCES_EXCLUDES, FrameworkSettings, aggregate, first_value, provider,
};
use super::config::{MachineWideSettings, Settings, read_settings};
use crate::error::Error;
use crate::runtime::Runtime;

/// Project value meaning "no values from settings".
pub const CLEAR_KEYWORD: &str = "clear";

pub const PACKAGE_SOURCES_SECTION: &str = "packageSources";
pub const DISABLED_SOURCES_SECTION: &str = "disabledPackageSources";
pub const FALLBACK_FOLDERS_SECTION: &str = "fallbackPackageFolders";
pub const CONFIG_SECTION: &str = "config";
pub const GLOBAL_PACKAGES_FOLDER_KEY: &str = "globalPackagesFolder";
pub const PACKAGES_ENV: &str = "PKGFOLD_PACKAGES";

/// Inputs declared by a project and its build invocation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RestoreSettingsRequest {
    pub project_path: PathBuf,
    pub solution_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub packages_path: Option<String>,
    pub sources: Option<Vec<String>>,
    pub sources_override: Option<Vec<String>>,
    pub fallback_folders: Option<Vec<String>>,
    pub fallback_folders_override: Option<Vec<String>>,
    pub per_framework: Vec<FrameworkSettings>,
}

impl RestoreSettingsRequest {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            ..Default::default()
        }
    }

    fn project_dir(&self) -> Option<&Path> {
        self.project_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
    }
}

/// Resolved settings handed to a restore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreSettings {
    pub sources: Vec<String>,
    pub fallback_folders: Vec<String>,
    pub packages_path: PathBuf,
    pub config_file_paths: Vec<PathBuf>,
}

pub struct RestoreSettingsResolver<'a, R: Runtime> {
    runtime: &'a R,
    machine_wide: &'a dyn MachineWideSettings,
}

impl<'a, R: Runtime> RestoreSettingsResolver<'a, R> {
    pub fn new(runtime: &'a R, machine_wide: &'a dyn MachineWideSettings) -> Self {
        Self {
            runtime,
            machine_wide,
        }
    }

    #[tracing::instrument(skip(self, request), fields(project = ?request.project_path))]
    pub fn resolve(&self, request: &RestoreSettingsRequest) -> Result<RestoreSettings> {
        let project_dir = request.project_dir();
        let config_file = request
            .config_file
            .as_deref()
            .map(|file| resolve_against(project_dir, file));

        let settings = read_settings(
            self.runtime,
            request.solution_dir.as_deref(),
            project_dir,
            config_file.as_deref(),
            self.machine_wide,
        )?;

        let sources = first_value([
            provider(|| request.sources_override.clone()),
            provider(|| cleared(request.sources.as_deref())),
            provider(|| request.sources.clone()),
            provider(|| Some(enabled_sources(&settings))),
        ])
        .unwrap_or_default();
        let sources = aggregate(
            &sources,
            &request.per_framework,
            ADDITIONAL_SOURCES,
            ADDITIONAL_SOURCES_EXCLUDES,
        );

        let fallback_folders = first_value([
            provider(|| request.fallback_folders_override.clone()),
            provider(|| cleared(request.fallback_folders.as_deref())),
            provider(|| request.fallback_folders.clone()),
            provider(|| Some(section_values(&settings, FALLBACK_FOLDERS_SECTION))),
        ])
        .unwrap_or_default();
        let fallback_folders = aggregate(
            &fallback_folders,
            &request.per_framework,
            ADDITIONAL_FALLBACK_FOLDERS,
            ADDITIONAL_FALLBACK_FOLDERS_EXCLUDES,
        );

        let packages_path = first_value([
            provider(|| {
                request
                    .packages_path
                    .as_deref()
                    .filter(|path| !path.trim().is_empty())
                    .map(|path| resolve_against(project_dir, Path::new(path)))
            }),
            provider(|| {
                settings
                    .get_value(CONFIG_SECTION, GLOBAL_PACKAGES_FOLDER_KEY)
                    .map(PathBuf::from)
            }),
            provider(|| {
                self.runtime
                    .env_var(PACKAGES_ENV)
                    .ok()
                    .filter(|value| !value.is_empty())
                    .map(PathBuf::from)
            }),
            provider(|| {
                self.runtime
                    .home_dir()
                    .map(|home| home.join(".pkgfold").join("packages"))
            }),
        ])
        .ok_or_else(|| {
            Error::invalid_argument(
                "packages_path",
                "no packages folder configured and no home directory available",
            )
        })?;

        debug!(
            "Resolved {} source(s), {} fallback folder(s), packages path {:?}",
            sources.len(),
            fallback_folders.len(),
            packages_path
        );

        Ok(RestoreSettings {
            sources,
            fallback_folders,
            packages_path,
            config_file_paths: settings.config_file_paths(),
        })
    }
}

/// `Some(empty)` when the project list contains the clear keyword.
fn cleared(values: Option<&[String]>) -> Option<Vec<String>> {
    values?
        .iter()
        .any(|value| value.trim().eq_ignore_ascii_case(CLEAR_KEYWORD))
        .then(Vec::new)
}

fn section_values(settings: &Settings, section: &str) -> Vec<String> {
    settings.get_section_values(section).into_values().collect()
}

fn enabled_sources(settings: &Settings) -> Vec<String> {
    let disabled = settings.get_section_values(DISABLED_SOURCES_SECTION);
    settings
        .get_section_values(PACKAGE_SOURCES_SECTION)
        .into_iter()
        .filter(|(name, _)| {
            !disabled
                .get(name)
                .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
        })
        .map(|(_, source)| source)
        .collect()
}

fn resolve_against(base: Option<&Path>, path: &Path) -> PathBuf {
    match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    }
}
