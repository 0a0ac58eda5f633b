//! Release configuration with provenance
//!
//! `ReleaseConfig` is loaded once at startup and passed by reference to every
//! pipeline stage. Tables absent from the file keep their built-in values;
//! a table present in the file replaces the built-in one wholesale.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::defaults;

/// Lookup tables and endpoints for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseConfig {
    /// Base URL that hosted folders are appended to
    #[serde(default = "default_download_root")]
    pub download_root: String,

    /// Classification substituted for unrecognised tokens
    #[serde(default = "default_unknown_build_type")]
    pub unknown_build_type: String,

    /// Classification token -> hosted folder
    #[serde(default = "defaults::build_types")]
    pub build_types: BTreeMap<String, String>,

    /// Classification token -> display name
    #[serde(default = "defaults::build_type_names")]
    pub build_type_names: BTreeMap<String, String>,

    /// Lower-cased platform token -> platform folder
    #[serde(default = "defaults::platforms")]
    pub platforms: BTreeMap<String, String>,

    /// Platform folder -> display name
    #[serde(default = "defaults::platform_names")]
    pub platform_names: BTreeMap<String, String>,

    /// Platform folder -> version-manager OS name
    #[serde(default = "defaults::external_platforms")]
    pub external_platforms: BTreeMap<String, String>,

    /// Grid code -> display name
    #[serde(default = "defaults::grid_names")]
    pub grid_names: BTreeMap<String, String>,

    /// Variant code -> display name
    #[serde(default = "defaults::variant_names")]
    pub variant_names: BTreeMap<String, String>,

    /// Platform folders in report order
    #[serde(default = "defaults::platform_order")]
    pub platform_order: Vec<String>,

    /// Version-manager endpoint (notification disabled when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_manager_url: Option<String>,

    /// Maximum length of one webhook message, in characters
    #[serde(default = "default_message_max_length")]
    pub message_max_length: usize,
}

fn default_download_root() -> String {
    defaults::DOWNLOAD_ROOT.to_string()
}

fn default_unknown_build_type() -> String {
    defaults::UNKNOWN_BUILD_TYPE.to_string()
}

fn default_message_max_length() -> usize {
    defaults::MESSAGE_MAX_LENGTH
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            unknown_build_type: default_unknown_build_type(),
            build_types: defaults::build_types(),
            build_type_names: defaults::build_type_names(),
            platforms: defaults::platforms(),
            platform_names: defaults::platform_names(),
            external_platforms: defaults::external_platforms(),
            grid_names: defaults::grid_names(),
            variant_names: defaults::variant_names(),
            platform_order: defaults::platform_order(),
            version_manager_url: None,
            message_max_length: default_message_max_length(),
        }
    }
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// File path (None for built-in defaults)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for built-in defaults)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),

    #[error("environment variable {var} has invalid value '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

impl ReleaseConfig {
    /// Load from `path`, or use built-in defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> Result<(Self, ConfigSource), ConfigError> {
        let Some(path) = path else {
            return Ok((
                Self::default(),
                ConfigSource {
                    path: None,
                    digest: None,
                },
            ));
        };

        let bytes = fs::read(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::Validation(format!("Invalid UTF-8: {}", e)))?;
        let config = Self::parse(&contents)?;

        log::info!("loaded config {} (sha256 {})", path.display(), digest);

        Ok((
            config,
            ConfigSource {
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            },
        ))
    }

    /// Parse and validate a TOML document
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: ReleaseConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.message_max_length == 0 {
            return Err(ConfigError::Validation(
                "message_max_length must be greater than 0".to_string(),
            ));
        }

        if self.download_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "download_root must not be empty".to_string(),
            ));
        }

        // Each classification owns its hosted folder
        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for (classification, folder) in &self.build_types {
            if let Some(other) = owners.insert(folder.as_str(), classification.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "build_types '{}' and '{}' share hosted folder '{}'",
                    other, classification, folder
                )));
            }
        }

        for folder in &self.platform_order {
            if !self.platform_names.contains_key(folder) {
                return Err(ConfigError::Validation(format!(
                    "platform_order entry '{}' has no platform_names entry",
                    folder
                )));
            }
        }

        Ok(())
    }

    /// Whether `classification` has its own hosted folder
    pub fn is_known_classification(&self, classification: &str) -> bool {
        self.build_types.contains_key(classification)
    }

    /// Hosted folder for a classification, falling back to the unknown bucket's folder
    pub fn hosted_folder_for(&self, classification: &str) -> &str {
        self.build_types
            .get(classification)
            .or_else(|| self.build_types.get(&self.unknown_build_type))
            .map(String::as_str)
            .unwrap_or("unknown")
    }

    /// Platform folder for a platform token
    pub fn hosted_folder_for_platform(&self, platform: &str) -> Option<&str> {
        self.platforms
            .get(&platform.to_lowercase())
            .map(String::as_str)
    }

    /// Version-manager OS name for a platform folder
    pub fn external_platform_name(&self, platform_folder: &str) -> Option<&str> {
        self.external_platforms
            .get(platform_folder)
            .map(String::as_str)
    }

    /// Display name for a classification, or the token itself
    pub fn build_type_name<'a>(&'a self, classification: &'a str) -> &'a str {
        self.build_type_names
            .get(classification)
            .map(String::as_str)
            .unwrap_or(classification)
    }

    /// Display name for a platform folder, or the folder itself
    pub fn platform_name<'a>(&'a self, platform_folder: &'a str) -> &'a str {
        self.platform_names
            .get(platform_folder)
            .map(String::as_str)
            .unwrap_or(platform_folder)
    }

    /// Display name for a grid code, or the code itself
    pub fn grid_name<'a>(&'a self, grid: &'a str) -> &'a str {
        self.grid_names.get(grid).map(String::as_str).unwrap_or(grid)
    }

    /// Display name for a variant code, or the code itself
    pub fn variant_name<'a>(&'a self, variant: &'a str) -> &'a str {
        self.variant_names
            .get(variant)
            .map(String::as_str)
            .unwrap_or(variant)
    }

    /// Public URL of a file inside the hosted tree
    pub fn download_uri(&self, hosted_folder: &str, platform_folder: &str, file_name: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.download_root.trim_end_matches('/'),
            hosted_folder,
            platform_folder,
            file_name
        )
    }
}
