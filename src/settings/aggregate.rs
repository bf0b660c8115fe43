//! Merging of per-framework restore items into one ordered list.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Sources a framework adds on top of the project's sources.
pub const ADDITIONAL_SOURCES: &str = "RestoreAdditionalProjectSources";
/// Sources a framework removes from the merged list.
pub const ADDITIONAL_SOURCES_EXCLUDES: &str = "RestoreAdditionalProjectSourcesExcludes";
/// Fallback folders a framework adds.
pub const ADDITIONAL_FALLBACK_FOLDERS: &str = "RestoreAdditionalProjectFallbackFolders";
/// Fallback folders a framework removes from the merged list.
pub const ADDITIONAL_FALLBACK_FOLDERS_EXCLUDES: &str =
    "RestoreAdditionalProjectFallbackFoldersExcludes";

/// Anything exposing named string metadata, such as a per-framework item.
pub trait MetadataItem {
    fn metadata(&self, key: &str) -> Option<&str>;
}

/// Restore settings declared for one target framework.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameworkSettings {
    pub name: String,
    #[serde(default)]
    pub metadata: IndexMap<String, String>,
}

impl FrameworkSettings {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metadata: IndexMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl MetadataItem for FrameworkSettings {
    fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Split a `;`-delimited field, trimming tokens and dropping empty ones.
pub fn split_tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|token| !token.is_empty())
}

/// Merge `base` with every item's `addition_key` tokens, then drop every
/// item's `exclusion_key` tokens.
///
/// Order is first appearance: base first, then items in iteration order.
/// Exclusions apply to the whole result, base included. Tokens compare
/// byte-for-byte.
pub fn aggregate<S, I>(base: &[S], items: &[I], addition_key: &str, exclusion_key: &str) -> Vec<String>
where
    S: AsRef<str>,
    I: MetadataItem,
{
    let mut merged: IndexSet<String> = base.iter().map(|s| s.as_ref().to_string()).collect();

    for token in items
        .iter()
        .filter_map(|item| item.metadata(addition_key))
        .flat_map(split_tokens)
    {
        if !merged.contains(token) {
            merged.insert(token.to_string());
        }
    }

    let excluded: HashSet<&str> = items
        .iter()
        .filter_map(|item| item.metadata(exclusion_key))
        .flat_map(split_tokens)
        .collect();

    merged.retain(|value| !excluded.contains(value.as_str()));
    merged.into_iter().collect()
}

/// A lazily evaluated candidate value for [`first_value`].
pub type Provider<'a, T> = Box<dyn FnOnce() -> Option<T> + 'a>;

pub fn provider<'a, T>(f: impl FnOnce() -> Option<T> + 'a) -> Provider<'a, T> {
    Box::new(f)
}

/// Evaluate providers in order and return the first `Some`.
///
/// Presence is all that counts: `Some(String::new())` or `Some(vec![])` wins
/// over later providers. A layer that explicitly configures "nothing" must
/// not be overridden by a lower layer's defaults.
pub fn first_value<'a, T>(providers: impl IntoIterator<Item = Provider<'a, T>>) -> Option<T> {
    providers.into_iter().find_map(|provide| provide())
}
