//! Restore settings: layered config files and per-framework merging.

pub mod aggregate;
pub mod config;
pub mod restore;

pub use aggregate::{FrameworkSettings, MetadataItem, aggregate, first_value, provider, split_tokens};
pub use config::{ConfigFile, MachineWideConfig, MachineWideSettings, Settings, read_settings};
pub use restore::{RestoreSettings, RestoreSettingsRequest, RestoreSettingsResolver};
