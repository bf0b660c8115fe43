//! Layered configuration files.
//!
//! Settings come from several `pkgfold.json` files. The nearest one to the
//! project wins:
//!
//! 1. every `pkgfold.json` from the project directory up to the filesystem root
//! 2. `<solution>/.pkgfold/pkgfold.json`
//! 3. the user file under the platform config directory
//! 4. machine-wide files, supplied by the caller
//!
//! A file is a JSON object of sections, each mapping keys to string values:
//!
//! ```json
//! { "packageSources": { "local": "/srv/feed" } }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use log::debug;

use crate::error::Error;
use crate::runtime::Runtime;

pub const CONFIG_FILE_NAME: &str = "pkgfold.json";
/// Folder under the solution directory that may hold a config file.
pub const SOLUTION_SETTINGS_FOLDER: &str = ".pkgfold";
/// Folder under the platform config directory holding the user file.
pub const USER_SETTINGS_FOLDER: &str = "pkgfold";

pub type Section = IndexMap<String, String>;

/// One parsed config file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    path: PathBuf,
    sections: IndexMap<String, Section>,
}

impl ConfigFile {
    pub fn new(path: impl Into<PathBuf>, sections: IndexMap<String, Section>) -> Self {
        Self {
            path: path.into(),
            sections,
        }
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        if !runtime.is_file(path) {
            return Err(Error::ConfigNotFound {
                path: path.to_path_buf(),
            }
            .into());
        }
        let content = runtime.read_to_string(path)?;
        let sections = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, sections))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn get_value(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section)?.get(key).map(String::as_str)
    }
}

/// Machine-wide config layers, resolved by whoever builds the settings.
pub trait MachineWideSettings: Send + Sync {
    fn config_files(&self) -> Vec<ConfigFile>;
}

/// Machine-wide layers loaded once from a directory.
#[derive(Debug, Clone, Default)]
pub struct MachineWideConfig {
    files: Vec<ConfigFile>,
}

impl MachineWideConfig {
    pub fn new(files: Vec<ConfigFile>) -> Self {
        Self { files }
    }

    /// Load `<dir>/pkgfold.json` if it exists; a missing file means no layers.
    pub fn from_dir<R: Runtime>(runtime: &R, dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !runtime.is_file(&path) {
            debug!("No machine-wide config at {:?}", path);
            return Ok(Self::default());
        }
        Ok(Self::new(vec![ConfigFile::load(runtime, &path)?]))
    }
}

impl MachineWideSettings for MachineWideConfig {
    fn config_files(&self) -> Vec<ConfigFile> {
        self.files.clone()
    }
}

/// Effective settings: config files ordered nearest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    files: Vec<ConfigFile>,
}

impl Settings {
    pub fn new(files: Vec<ConfigFile>) -> Self {
        Self { files }
    }

    /// Value from the nearest file that defines it.
    pub fn get_value(&self, section: &str, key: &str) -> Option<&str> {
        self.files
            .iter()
            .find_map(|file| file.get_value(section, key))
    }

    /// Every key of `section` across all layers.
    ///
    /// The nearest layer supplies the value; a key keeps the position it had
    /// in the farthest layer that declares it.
    pub fn get_section_values(&self, section: &str) -> Section {
        let mut merged = Section::new();
        for file in self.files.iter().rev() {
            if let Some(values) = file.section(section) {
                for (key, value) in values {
                    merged.insert(key.clone(), value.clone());
                }
            }
        }
        merged
    }

    pub fn config_file_paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path().to_path_buf()).collect()
    }
}

/// Build the layered settings for a project.
///
/// An explicit `config_file` replaces discovery entirely: it becomes the only
/// layer, machine-wide files included.
#[tracing::instrument(skip(runtime, machine_wide))]
pub fn read_settings<R: Runtime>(
    runtime: &R,
    solution_dir: Option<&Path>,
    project_dir: Option<&Path>,
    config_file: Option<&Path>,
    machine_wide: &dyn MachineWideSettings,
) -> Result<Settings> {
    if let Some(config_file) = config_file {
        return Ok(Settings::new(vec![ConfigFile::load(runtime, config_file)?]));
    }

    let mut paths: Vec<PathBuf> = Vec::new();
    let mut push = |path: PathBuf| {
        if runtime.is_file(&path) && !paths.contains(&path) {
            paths.push(path);
        }
    };

    if let Some(project_dir) = project_dir {
        for dir in project_dir.ancestors() {
            push(dir.join(CONFIG_FILE_NAME));
        }
    }
    if let Some(solution_dir) = solution_dir {
        push(
            solution_dir
                .join(SOLUTION_SETTINGS_FOLDER)
                .join(CONFIG_FILE_NAME),
        );
    }
    if let Some(config_dir) = runtime.config_dir() {
        push(config_dir.join(USER_SETTINGS_FOLDER).join(CONFIG_FILE_NAME));
    }

    let mut files = paths
        .iter()
        .map(|path| ConfigFile::load(runtime, path))
        .collect::<Result<Vec<_>>>()?;
    files.extend(machine_wide.config_files());

    debug!("Loaded {} config file(s)", files.len());
    Ok(Settings::new(files))
}
