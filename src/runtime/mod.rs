//! Runtime abstraction for system operations.
//!
//! The package store and the settings loader never touch `std::fs` or
//! `std::env` directly; they go through [`Runtime`] so tests can swap in a
//! `MockRuntime`.
//!
//! # Structure
//!
//! - `env` - Environment variables and well-known directories
//! - `fs` - File system operations (read, write, directory)

mod env;
mod fs;

use anyhow::Result;
use std::env as std_env;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;
    fn current_dir(&self) -> Result<PathBuf>;

    // File System
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn is_file(&self, path: &Path) -> bool;
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;
    fn open_file(&self, path: &Path) -> Result<std::fs::File>;
    fn rename(&self, from: &Path, to: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;

    // Directories
    fn home_dir(&self) -> Option<PathBuf>;
    fn config_dir(&self) -> Option<PathBuf>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn current_dir(&self) -> Result<PathBuf> {
        self.current_dir_impl()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_file_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn open_file(&self, path: &Path) -> Result<std::fs::File> {
        self.open_file_impl(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        self.rename_impl(from, to)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.config_dir_impl()
    }
}

/// Test runtime that sees only files under `root`.
///
/// `root` doubles as the home directory. There is no user config directory
/// and no environment variable is set.
#[cfg(test)]
pub(crate) fn isolated_runtime(root: PathBuf) -> MockRuntime {
    let mut runtime = MockRuntime::new();
    runtime.expect_config_dir().returning(|| None);
    let home = root.clone();
    runtime
        .expect_home_dir()
        .returning(move || Some(home.clone()));
    runtime
        .expect_env_var()
        .returning(|_| Err(std_env::VarError::NotPresent));
    let visible = root.clone();
    runtime
        .expect_is_file()
        .returning(move |p| p.starts_with(&visible) && RealRuntime.is_file(p));
    runtime.expect_read_to_string().returning(move |p| {
        if !p.starts_with(&root) {
            anyhow::bail!("{:?} is outside the test root", p);
        }
        RealRuntime.read_to_string(p)
    });
    runtime
}
