//! Download list report
//!
//! Renders a build group as the text posted to the release channel: one
//! section per configured platform, one entry per grid and variant, with
//! missing combinations spelled out as NOT AVAILABLE.

mod chunk;

pub use chunk::chunk_report;

use crate::config::ReleaseConfig;
use crate::registry::{ArtifactKey, BuildGroup, Grid, Variant};

/// Line that opens every platform section and closes the report
pub const SEPARATOR: &str =
    "-------------------------------------------------------------------------------------------------------";

/// Marker for grid/variant/platform combinations with no artifact
pub const NOT_AVAILABLE: &str = "NOT AVAILABLE";

/// Render the download list for one build group
pub fn format_report(group: &BuildGroup, config: &ReleaseConfig) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!(
        "DOWNLOADS - {}",
        config.build_type_name(&group.classification)
    ));

    for platform_folder in &config.platform_order {
        let platform_name = config.platform_name(platform_folder);
        lines.push(SEPARATOR.to_string());
        lines.push(platform_name.to_string());
        lines.push(String::new());

        for grid in Grid::ALL {
            for variant in Variant::ALL {
                let label = format!(
                    "{} for {} ({})",
                    platform_name,
                    config.grid_name(grid.code()),
                    config.variant_name(variant.code())
                );

                match group.artifact(&ArtifactKey::new(grid, variant, platform_folder)) {
                    Some(record) => {
                        lines.push(label);
                        lines.push(record.download_uri.clone());
                        lines.push(String::new());
                        lines.push(format!("MD5: {}", record.checksum));
                        lines.push(String::new());
                    }
                    None => {
                        lines.push(format!("{} - {}", label, NOT_AVAILABLE));
                        lines.push(String::new());
                    }
                }
            }
        }
    }

    lines.push(SEPARATOR.to_string());

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ArtifactRecord;
    use std::path::PathBuf;

    fn group_with_windows_sl() -> BuildGroup {
        let mut group = BuildGroup::new("Release", "release", PathBuf::from("/out/release"));
        group.add_platform_folder("windows");
        group.insert_artifact(
            ArtifactKey::new(Grid::SecondLife, Variant::Regular, "windows"),
            ArtifactRecord {
                file_path: PathBuf::from("/out/release/windows/Setup.exe"),
                download_uri: "https://dl.example.org/release/windows/Setup.exe".to_string(),
                grid: Grid::SecondLife,
                variant: Variant::Regular,
                external_platform: "windows".to_string(),
                checksum: "3094776f5db11b6a959b0f3aed068c6a".to_string(),
            },
        );
        group
    }

    #[test]
    fn test_report_lists_available_artifact() {
        let report = format_report(&group_with_windows_sl(), &ReleaseConfig::default());

        assert!(report.starts_with("DOWNLOADS - Release\n"));
        assert!(report.contains(
            "MS Windows for Second Life (Regular)\nhttps://dl.example.org/release/windows/Setup.exe\n\nMD5: 3094776f5db11b6a959b0f3aed068c6a\n"
        ));
    }

    #[test]
    fn test_report_marks_missing_combinations() {
        let report = format_report(&group_with_windows_sl(), &ReleaseConfig::default());

        assert!(report.contains("MS Windows for OpenSim (Regular) - NOT AVAILABLE"));
        assert!(report.contains("MS Windows for Second Life (AVX2) - NOT AVAILABLE"));
        assert!(report.contains("Linux for OpenSim (AVX2) - NOT AVAILABLE"));
        // 3 platforms x 4 combinations, one available
        assert_eq!(report.matches(NOT_AVAILABLE).count(), 11);
    }

    #[test]
    fn test_report_follows_platform_order() {
        let report = format_report(&group_with_windows_sl(), &ReleaseConfig::default());

        let windows = report.find("\nMS Windows\n").unwrap();
        let mac = report.find("\nMacOS\n").unwrap();
        let linux = report.find("\nLinux\n").unwrap();
        assert!(windows < mac && mac < linux);
        // one separator per platform plus the closing one
        assert_eq!(report.matches(SEPARATOR).count(), 4);
        assert!(report.ends_with(&format!("{}\n", SEPARATOR)));
    }
}
