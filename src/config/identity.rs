//! Build identity from the CI environment

use serde::{Deserialize, Serialize};

use super::effective::ConfigError;

/// Variable holding the dotted viewer version
pub const ENV_VERSION: &str = "FS_VIEWER_VERSION";

/// Variable holding the numeric build number
pub const ENV_BUILD_NUMBER: &str = "FS_VIEWER_BUILD";

/// Variable holding the release channel
pub const ENV_CHANNEL: &str = "FS_VIEWER_CHANNEL";

/// Variable holding the version-manager shared secret
pub const ENV_VERSION_MGR_KEY: &str = "FS_VERSION_MGR_KEY";

/// Version, build number and channel of the build being published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildIdentity {
    pub version: String,
    pub build_number: u64,
    pub channel: String,
}

impl BuildIdentity {
    /// Read the identity from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the identity through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(var))
        };

        let version = required(ENV_VERSION)?;
        let raw_build = required(ENV_BUILD_NUMBER)?;
        let build_number = raw_build
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidEnv {
                var: ENV_BUILD_NUMBER,
                value: raw_build.clone(),
            })?;
        let channel = required(ENV_CHANNEL)?;

        Ok(Self {
            version,
            build_number,
            channel,
        })
    }
}

/// Read the version-manager shared secret from the process environment
pub fn version_manager_secret() -> Result<String, ConfigError> {
    std::env::var(ENV_VERSION_MGR_KEY)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::MissingEnv(ENV_VERSION_MGR_KEY))
}
