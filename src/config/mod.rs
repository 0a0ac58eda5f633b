//! Release configuration
//!
//! Two sources feed a run:
//! 1. Lookup tables and endpoints (built-in defaults, optionally a TOML file)
//! 2. Build identity from the CI environment

mod defaults;
mod effective;
mod identity;

pub use defaults::{DOWNLOAD_ROOT, MESSAGE_MAX_LENGTH, UNKNOWN_BUILD_TYPE};
pub use effective::{ConfigError, ConfigSource, ReleaseConfig};
pub use identity::{
    version_manager_secret, BuildIdentity, ENV_BUILD_NUMBER, ENV_CHANNEL, ENV_VERSION,
    ENV_VERSION_MGR_KEY,
};
