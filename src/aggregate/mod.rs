//! Build info aggregation
//!
//! After restructuring, each platform folder holds only downloadable files.
//! The aggregator checksums every file, classifies it by grid and variant,
//! and records it in the group's `downloadable_artifacts` under
//! `{grid, variant, platform_folder}`. A later file for the same key
//! replaces the earlier one.

mod checksum;

pub use checksum::{md5_file, strip_continuation_marker};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::ReleaseConfig;
use crate::registry::{ArtifactKey, ArtifactRecord, BuildGroup, Grid, Variant};

/// Errors for aggregating one platform folder or file
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("cannot list {path}: {source}")]
    Enumerate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot checksum {path}: {source}")]
    Checksum {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What aggregation recorded
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AggregateSummary {
    /// Records inserted (including replacements)
    pub recorded: usize,
    /// Inserts that replaced an existing record
    pub replaced: usize,
    /// Platform folders that could not be listed
    pub failed_folders: Vec<String>,
}

/// Populate `group.downloadable_artifacts` from its platform folders
///
/// Folder- and file-level failures are logged and skipped.
pub fn aggregate_group(group: &mut BuildGroup, config: &ReleaseConfig) -> AggregateSummary {
    let mut summary = AggregateSummary::default();
    let platform_folders: Vec<String> = group.platform_folders.iter().cloned().collect();

    for platform_folder in platform_folders {
        let dir = group.root_path.join(&platform_folder);
        let files = match list_files(&dir) {
            Ok(files) => files,
            Err(e) => {
                log::error!("{}", e);
                summary.failed_folders.push(platform_folder);
                continue;
            }
        };

        for file in files {
            let record = match build_record(group, config, &platform_folder, &file) {
                Ok(record) => record,
                Err(e) => {
                    log::error!("{}", e);
                    continue;
                }
            };

            let key = ArtifactKey::new(record.grid, record.variant, &platform_folder);
            log::debug!("{} -> {} ({})", key, record.file_name(), record.checksum);
            if let Some(previous) = group.insert_artifact(key.clone(), record) {
                log::warn!(
                    "{} already had {}, replaced",
                    key,
                    previous.file_path.display()
                );
                summary.replaced += 1;
            }
            summary.recorded += 1;
        }
    }

    log::info!(
        "aggregated {}: {} artifact(s)",
        group.classification,
        group.downloadable_artifacts.len()
    );

    summary
}

/// Regular files directly inside `dir`, sorted by name
pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, AggregateError> {
    let enumerate_err = |source| AggregateError::Enumerate {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(enumerate_err)? {
        let entry = entry.map_err(enumerate_err)?;
        if entry.file_type().map_err(enumerate_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();

    Ok(files)
}

fn build_record(
    group: &BuildGroup,
    config: &ReleaseConfig,
    platform_folder: &str,
    file: &Path,
) -> Result<ArtifactRecord, AggregateError> {
    let checksum = md5_file(file).map_err(|source| AggregateError::Checksum {
        path: file.to_path_buf(),
        source,
    })?;

    let file_name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let external_platform = config
        .external_platform_name(platform_folder)
        .unwrap_or(platform_folder)
        .to_string();

    Ok(ArtifactRecord {
        file_path: file.to_path_buf(),
        download_uri: config.download_uri(&group.hosted_folder, platform_folder, &file_name),
        grid: Grid::from_file_name(&file_name),
        variant: Variant::from_file_name(&file_name),
        external_platform,
        checksum: strip_continuation_marker(&checksum).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn group_with(root: &Path, platforms: &[&str]) -> BuildGroup {
        let mut group = BuildGroup::new("Release", "release", root.to_path_buf());
        for p in platforms {
            group.add_platform_folder(p);
        }
        group
    }

    #[test]
    fn test_aggregate_classifies_files() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("release");
        let windows = root.join("windows");
        fs::create_dir_all(&windows).unwrap();
        fs::write(windows.join("Phoenix-Firestorm-Releasex64-7-1-11-76496_Setup.exe"), b"sl").unwrap();
        fs::write(windows.join("Phoenix-FirestormOS-Releasex64-7-1-11-76496_Setup.exe"), b"os").unwrap();
        fs::write(
            windows.join("Phoenix-Firestorm-Releasex64-AVX2-7-1-11-76496_Setup.exe"),
            b"avx",
        )
        .unwrap();

        let config = ReleaseConfig::default();
        let mut group = group_with(&root, &["windows"]);
        let summary = aggregate_group(&mut group, &config);

        assert_eq!(summary.recorded, 3);
        assert_eq!(group.downloadable_artifacts.len(), 3);

        let sl = group
            .artifact(&ArtifactKey::new(Grid::SecondLife, Variant::Regular, "windows"))
            .unwrap();
        assert_eq!(
            sl.download_uri,
            "https://downloads.firestormviewer.org/release/windows/Phoenix-Firestorm-Releasex64-7-1-11-76496_Setup.exe"
        );
        assert_eq!(sl.external_platform, "windows");
        assert_eq!(sl.checksum.len(), 32);

        assert!(group
            .artifact(&ArtifactKey::new(Grid::OpenSim, Variant::Regular, "windows"))
            .is_some());
        assert!(group
            .artifact(&ArtifactKey::new(Grid::SecondLife, Variant::Avx, "windows"))
            .is_some());
        assert!(group
            .artifact(&ArtifactKey::new(Grid::OpenSim, Variant::Avx, "windows"))
            .is_none());
    }

    #[test]
    fn test_missing_platform_folder_yields_no_records() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("release");
        fs::create_dir_all(root.join("linux")).unwrap();
        fs::write(root.join("linux/Phoenix-Firestorm-Releasex64.tar.xz"), b"l").unwrap();

        let config = ReleaseConfig::default();
        let mut group = group_with(&root, &["mac", "linux"]);
        let summary = aggregate_group(&mut group, &config);

        assert_eq!(summary.failed_folders, vec!["mac".to_string()]);
        assert_eq!(group.downloadable_artifacts.len(), 1);
    }

    #[test]
    fn test_aggregate_twice_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("release");
        fs::create_dir_all(root.join("linux")).unwrap();
        fs::write(root.join("linux/Phoenix-Firestorm-Releasex64.tar.xz"), b"l").unwrap();
        fs::write(root.join("linux/Phoenix-FirestormOS-Releasex64.tar.xz"), b"o").unwrap();

        let config = ReleaseConfig::default();
        let mut group = group_with(&root, &["linux"]);
        aggregate_group(&mut group, &config);
        let first = group.downloadable_artifacts.clone();
        aggregate_group(&mut group, &config);

        assert_eq!(group.downloadable_artifacts, first);
    }

    #[test]
    fn test_same_key_last_file_wins() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("release");
        fs::create_dir_all(root.join("linux")).unwrap();
        fs::write(root.join("linux/a-Phoenix-Firestorm.tar.xz"), b"first").unwrap();
        fs::write(root.join("linux/b-Phoenix-Firestorm.tar.xz"), b"second").unwrap();

        let config = ReleaseConfig::default();
        let mut group = group_with(&root, &["linux"]);
        let summary = aggregate_group(&mut group, &config);

        assert_eq!(summary.replaced, 1);
        let record = group
            .artifact(&ArtifactKey::new(Grid::SecondLife, Variant::Regular, "linux"))
            .unwrap();
        assert_eq!(record.file_name(), "b-Phoenix-Firestorm.tar.xz");
        assert_eq!(record.checksum, md5_file(&root.join("linux/b-Phoenix-Firestorm.tar.xz")).unwrap());
    }

    #[test]
    fn test_list_files_ignores_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();

        let files = list_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.txt"), dir.path().join("b.txt")]);
    }
}
