//! Composite key for downloadable artifacts

use serde::{Deserialize, Serialize};
use std::fmt;

/// File name marker for OpenSim builds
pub const GRID_OS_MARKER: &str = "FirestormOS-";

/// File name marker for AVX2 builds
pub const VARIANT_AVX_MARKER: &str = "AVX2";

/// Target grid of a viewer build
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grid {
    #[serde(rename = "SL")]
    SecondLife,
    #[serde(rename = "OS")]
    OpenSim,
}

impl Grid {
    /// Report order
    pub const ALL: [Grid; 2] = [Grid::SecondLife, Grid::OpenSim];

    pub fn code(self) -> &'static str {
        match self {
            Grid::SecondLife => "SL",
            Grid::OpenSim => "OS",
        }
    }

    /// Classify a file by its name; builds without the OpenSim marker target SL
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.contains(GRID_OS_MARKER) {
            Grid::OpenSim
        } else {
            Grid::SecondLife
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Build flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Regular,
    Avx,
}

impl Variant {
    /// Report order
    pub const ALL: [Variant; 2] = [Variant::Regular, Variant::Avx];

    pub fn code(self) -> &'static str {
        match self {
            Variant::Regular => "regular",
            Variant::Avx => "avx",
        }
    }

    /// Classify a file by its name; builds without the AVX2 marker are regular
    pub fn from_file_name(file_name: &str) -> Self {
        if file_name.contains(VARIANT_AVX_MARKER) {
            Variant::Avx
        } else {
            Variant::Regular
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// `{grid, variant, platform_folder}`, unique within a build group
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub grid: Grid,
    pub variant: Variant,
    pub platform_folder: String,
}

impl ArtifactKey {
    pub fn new(grid: Grid, variant: Variant, platform_folder: &str) -> Self {
        Self {
            grid,
            variant,
            platform_folder: platform_folder.to_string(),
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.grid, self.variant, self.platform_folder)
    }
}
