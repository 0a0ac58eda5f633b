//! Built-in lookup tables
//!
//! Hardcoded defaults used when no config file is supplied, or for any
//! table a config file leaves out.

use std::collections::BTreeMap;

/// Classification used for tokens missing from `build_types`.
pub const UNKNOWN_BUILD_TYPE: &str = "Unknown";

/// Default base URL for public downloads.
pub const DOWNLOAD_ROOT: &str = "https://downloads.firestormviewer.org";

/// Default maximum length of one webhook message.
pub const MESSAGE_MAX_LENGTH: usize = 2000;

fn table(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Classification token -> hosted folder.
pub fn build_types() -> BTreeMap<String, String> {
    table(&[
        ("Release", "release"),
        ("Beta", "preview"),
        ("Alpha", "test"),
        ("Nightly", "nightly"),
        ("Unknown", "unknown"),
    ])
}

/// Classification token -> display name.
pub fn build_type_names() -> BTreeMap<String, String> {
    table(&[
        ("Release", "Release"),
        ("Beta", "Beta"),
        ("Alpha", "Alpha"),
        ("Nightly", "Nightly"),
        ("Unknown", "Unknown"),
    ])
}

/// Lower-cased platform token -> platform folder.
pub fn platforms() -> BTreeMap<String, String> {
    table(&[
        ("windows", "windows"),
        ("win", "windows"),
        ("macos", "mac"),
        ("mac", "mac"),
        ("darwin", "mac"),
        ("linux", "linux"),
        ("ubuntu", "linux"),
    ])
}

/// Platform folder -> display name.
pub fn platform_names() -> BTreeMap<String, String> {
    table(&[
        ("windows", "MS Windows"),
        ("mac", "MacOS"),
        ("linux", "Linux"),
    ])
}

/// Platform folder -> operating system name used by the version-manager.
pub fn external_platforms() -> BTreeMap<String, String> {
    table(&[
        ("windows", "windows"),
        ("mac", "macos"),
        ("linux", "linux"),
    ])
}

/// Grid code -> display name.
pub fn grid_names() -> BTreeMap<String, String> {
    table(&[("SL", "Second Life"), ("OS", "OpenSim")])
}

/// Variant code -> display name.
pub fn variant_names() -> BTreeMap<String, String> {
    table(&[("regular", "Regular"), ("avx", "AVX2")])
}

/// Platform folders in report order.
pub fn platform_order() -> Vec<String> {
    vec!["windows".to_string(), "mac".to_string(), "linux".to_string()]
}
