//! Request body for a build-availability notice.

use serde::{Deserialize, Serialize};

/// One downloadable build, as the version-manager expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildNotification {
    /// Day-scoped auth token (see [`crate::token`]).
    pub secret: String,
    /// Release channel the build belongs to (e.g. `Release`, `Beta`).
    pub viewer_channel: String,
    /// Target grid (`SL` or `OS`).
    pub grid_type: String,
    /// Operating system name as known to the version-manager.
    pub operating_system: String,
    /// Build variant (`regular`, `avx`).
    pub build_type: String,
    /// Dotted version string.
    pub viewer_version: String,
    /// Numeric build number.
    pub build_number: u64,
    /// Public download URL.
    pub download_link: String,
    /// Hex MD5 of the downloadable file.
    pub md5_checksum: String,
}
