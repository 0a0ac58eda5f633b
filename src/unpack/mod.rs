//! Artifact unpacking
//!
//! Walks an input directory of CI artifact archives (or already-extracted
//! artifact directories), decodes each name, and lays the contents out as
//! `output_root/<hosted folder>/<platform folder>/`. A bad item is logged
//! and skipped; the rest of the directory is still processed.

mod extract;

pub use extract::{extract_archive, extract_tar, extract_zip, merge_dir, ArchiveKind};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use artifact_name::{ArtifactFilename, ParseError};

use crate::config::ReleaseConfig;
use crate::registry::BuildRegistry;

/// Errors for unpacking one candidate
#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    #[error(transparent)]
    MalformedName(#[from] ParseError),

    #[error("no platform folder configured for platform '{0}'")]
    UnmappedPlatform(String),

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("refusing to extract entry outside destination: {0}")]
    UnsafeEntry(String),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Where one candidate ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedItem {
    pub source: PathBuf,
    pub classification: String,
    pub platform_folder: String,
    pub destination: PathBuf,
}

/// Outcome of unpacking a directory
#[derive(Debug, Default)]
pub struct UnpackSummary {
    /// Candidates unpacked, in processing order
    pub unpacked: Vec<UnpackedItem>,
    /// Candidates skipped, with the reason
    pub skipped: Vec<(PathBuf, String)>,
}

/// Unpacks artifact archives into the hosted tree
pub struct Unpacker<'a> {
    config: &'a ReleaseConfig,
    output_root: PathBuf,
}

impl<'a> Unpacker<'a> {
    pub fn new(config: &'a ReleaseConfig, output_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_root: output_root.into(),
        }
    }

    /// Unpack every candidate in `input_dir`, extending `registry`
    ///
    /// Candidates are processed in file name order. Only a failure to list
    /// `input_dir` itself is returned as an error.
    pub fn unpack_dir(
        &self,
        input_dir: &Path,
        registry: &mut BuildRegistry,
    ) -> Result<UnpackSummary, UnpackError> {
        let io_err = |source| UnpackError::Io {
            path: input_dir.to_path_buf(),
            source,
        };

        let mut candidates: Vec<PathBuf> = fs::read_dir(input_dir)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()
            .map_err(io_err)?;
        candidates.sort();

        log::info!(
            "unpacking {} candidate(s) from {}",
            candidates.len(),
            input_dir.display()
        );

        let mut summary = UnpackSummary::default();
        for candidate in candidates {
            match self.unpack_one(&candidate, registry) {
                Ok(item) => {
                    log::info!(
                        "unpacked {} -> {}",
                        candidate.display(),
                        item.destination.display()
                    );
                    summary.unpacked.push(item);
                }
                Err(e) => {
                    log::error!("skipping {}: {}", candidate.display(), e);
                    summary.skipped.push((candidate, e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Unpack a single archive or artifact directory
    pub fn unpack_one(
        &self,
        source: &Path,
        registry: &mut BuildRegistry,
    ) -> Result<UnpackedItem, UnpackError> {
        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let parsed = ArtifactFilename::parse(&file_name)?;

        let classification = if self.config.is_known_classification(&parsed.classification) {
            parsed.classification.clone()
        } else {
            log::warn!(
                "unknown classification '{}' in {}, using '{}'",
                parsed.classification,
                file_name,
                self.config.unknown_build_type
            );
            self.config.unknown_build_type.clone()
        };

        let hosted_folder = self.config.hosted_folder_for(&classification).to_string();
        let platform_folder = self
            .config
            .hosted_folder_for_platform(&parsed.platform)
            .ok_or_else(|| UnpackError::UnmappedPlatform(parsed.platform.clone()))?
            .to_string();

        let group_root = self.output_root.join(&hosted_folder);
        let destination = group_root.join(&platform_folder);

        if source.is_dir() {
            merge_dir(source, &destination)?;
        } else {
            extract_archive(source, &destination)?;
        }

        registry
            .group_entry(&classification, &hosted_folder, group_root)
            .add_platform_folder(&platform_folder);

        Ok(UnpackedItem {
            source: source.to_path_buf(),
            classification,
            platform_folder,
            destination,
        })
    }
}
