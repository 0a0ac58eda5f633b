//! Artifact archive name parser.
//!
//! CI uploads one archive per build job, named
//! `classification-platform-platformVersion-variant-grid-artifacts.<ext>`.
//! This crate decodes such a name into typed fields without touching the
//! filesystem.

mod error;

pub use error::ParseError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal that must appear as the sixth dash-separated segment.
pub const ARTIFACTS_SUFFIX: &str = "artifacts";

/// Minimum number of dash-separated segments in a valid name.
pub const MIN_SEGMENTS: usize = 6;

/// Fields decoded from an artifact archive name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactFilename {
    /// Build classification token (e.g. `Release`), case preserved.
    pub classification: String,
    /// Platform token, lower-cased.
    pub platform: String,
    /// Platform version (e.g. `2022`, `22.04`), case preserved.
    pub platform_version: String,
    /// Build variant token, case preserved.
    pub variant: String,
    /// Grid token, lower-cased.
    pub grid: String,
}

impl ArtifactFilename {
    /// Parse an archive or directory name.
    ///
    /// Only the final path component is considered, so callers may pass
    /// either a bare file name or a full path string.
    pub fn parse(name: &str) -> Result<Self, ParseError> {
        let file_name = name
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(name);

        let segments: Vec<&str> = file_name.split('-').collect();
        if segments.len() < MIN_SEGMENTS {
            return Err(ParseError::TooFewSegments {
                name: file_name.to_string(),
                found: segments.len(),
            });
        }

        // `artifacts.zip`, `artifacts.tar.gz` and a bare `artifacts` directory all qualify
        let suffix = segments[5];
        let suffix_stem = suffix.split('.').next().unwrap_or(suffix);
        if !suffix_stem.eq_ignore_ascii_case(ARTIFACTS_SUFFIX) {
            return Err(ParseError::MissingSuffix {
                name: file_name.to_string(),
                found: suffix.to_string(),
            });
        }

        Ok(Self {
            classification: segments[0].to_string(),
            platform: segments[1].to_lowercase(),
            platform_version: segments[2].to_string(),
            variant: segments[3].to_string(),
            grid: segments[4].to_lowercase(),
        })
    }
}

impl FromStr for ArtifactFilename {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArtifactFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}-{}-{}",
            self.classification,
            self.platform,
            self.platform_version,
            self.variant,
            self.grid,
            ARTIFACTS_SUFFIX
        )
    }
}
