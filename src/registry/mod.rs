//! In-memory registry of one pipeline run
//!
//! The registry maps each classification discovered in the input directory
//! to a [`BuildGroup`]. The unpacker creates groups and records platform
//! folders; the aggregator fills in downloadable artifacts; the report and
//! notifier only read.

mod key;

pub use key::{ArtifactKey, Grid, Variant, GRID_OS_MARKER, VARIANT_AVX_MARKER};

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// A downloadable file found in the restructured tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    /// Location on disk
    pub file_path: PathBuf,
    /// Public download URL
    pub download_uri: String,
    pub grid: Grid,
    pub variant: Variant,
    /// Operating system name expected by the version-manager
    pub external_platform: String,
    /// Hex MD5 of the file contents
    pub checksum: String,
}

impl ArtifactRecord {
    /// File name component of `file_path`
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Everything known about one classification during a run
#[derive(Debug, Clone)]
pub struct BuildGroup {
    /// Classification token (after unknown-token substitution)
    pub classification: String,
    /// Hosted folder the classification publishes under
    pub hosted_folder: String,
    /// `output_root/hosted_folder`
    pub root_path: PathBuf,
    /// Platform folders unpacked under `root_path`
    pub platform_folders: BTreeSet<String>,
    /// Downloadable artifacts; one per key, last insert wins
    pub downloadable_artifacts: BTreeMap<ArtifactKey, ArtifactRecord>,
}

impl BuildGroup {
    pub fn new(classification: &str, hosted_folder: &str, root_path: PathBuf) -> Self {
        Self {
            classification: classification.to_string(),
            hosted_folder: hosted_folder.to_string(),
            root_path,
            platform_folders: BTreeSet::new(),
            downloadable_artifacts: BTreeMap::new(),
        }
    }

    /// Record a platform folder; returns false if it was already present
    pub fn add_platform_folder(&mut self, platform_folder: &str) -> bool {
        self.platform_folders.insert(platform_folder.to_string())
    }

    /// Insert a record, returning the one it replaced
    pub fn insert_artifact(
        &mut self,
        key: ArtifactKey,
        record: ArtifactRecord,
    ) -> Option<ArtifactRecord> {
        self.downloadable_artifacts.insert(key, record)
    }

    /// Look up the record for a key
    pub fn artifact(&self, key: &ArtifactKey) -> Option<&ArtifactRecord> {
        self.downloadable_artifacts.get(key)
    }

    /// JSON view with string keys
    pub fn to_json(&self) -> Value {
        let artifacts: serde_json::Map<String, Value> = self
            .downloadable_artifacts
            .iter()
            .map(|(key, record)| {
                (
                    key.to_string(),
                    serde_json::to_value(record).unwrap_or(Value::Null),
                )
            })
            .collect();

        json!({
            "classification": self.classification,
            "hosted_folder": self.hosted_folder,
            "root_path": self.root_path,
            "platform_folders": self.platform_folders,
            "downloadable_artifacts": artifacts,
        })
    }
}

/// Classification -> group, for one run
#[derive(Debug, Clone, Default)]
pub struct BuildRegistry {
    groups: BTreeMap<String, BuildGroup>,
}

impl BuildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the group for `classification`, creating it on first sight
    pub fn group_entry(
        &mut self,
        classification: &str,
        hosted_folder: &str,
        root_path: PathBuf,
    ) -> &mut BuildGroup {
        self.groups
            .entry(classification.to_string())
            .or_insert_with(|| BuildGroup::new(classification, hosted_folder, root_path))
    }

    pub fn get(&self, classification: &str) -> Option<&BuildGroup> {
        self.groups.get(classification)
    }

    pub fn get_mut(&mut self, classification: &str) -> Option<&mut BuildGroup> {
        self.groups.get_mut(classification)
    }

    /// Groups in classification order
    pub fn groups(&self) -> impl Iterator<Item = &BuildGroup> {
        self.groups.values()
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut BuildGroup> {
        self.groups.values_mut()
    }

    pub fn classifications(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// JSON view of every group
    pub fn to_json(&self) -> Value {
        Value::Array(self.groups.values().map(BuildGroup::to_json).collect())
    }
}
