//! Debug-symbol file matching

use globset::{Glob, GlobSet, GlobSetBuilder};

/// Folder under a group root that receives symbol files
pub const SYMBOLS_FOLDER: &str = "symbols";

/// File name patterns of debug-symbol archives
pub const SYMBOL_PATTERNS: &[&str] = &["*_hvk*", "*_oss*"];

/// Matches debug-symbol file names
#[derive(Debug)]
pub struct SymbolMatcher {
    glob_set: GlobSet,
}

impl SymbolMatcher {
    /// Matcher for [`SYMBOL_PATTERNS`]
    pub fn new() -> Result<Self, globset::Error> {
        Self::with_patterns(SYMBOL_PATTERNS)
    }

    /// Matcher for arbitrary patterns
    pub fn with_patterns(patterns: &[&str]) -> Result<Self, globset::Error> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            glob_set: builder.build()?,
        })
    }

    /// Check a bare file name
    pub fn is_symbol_file(&self, file_name: &str) -> bool {
        self.glob_set.is_match(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns() {
        let matcher = SymbolMatcher::new().unwrap();
        assert!(matcher.is_symbol_file("Phoenix_Firestorm-Release_x64_7.1.11.76496_hvk.tar.bz2"));
        assert!(matcher.is_symbol_file("firestorm-symbols-linux_oss.tar.xz"));
        assert!(!matcher.is_symbol_file("Phoenix-Firestorm-Releasex64-7-1-11-76496_Setup.exe"));
        assert!(!matcher.is_symbol_file("Phoenix-FirestormOS-Releasex64-7-1-11-76496.dmg"));
    }

    #[test]
    fn test_custom_patterns() {
        let matcher = SymbolMatcher::with_patterns(&["*.pdb", ""]).unwrap();
        assert!(matcher.is_symbol_file("viewer.pdb"));
        assert!(!matcher.is_symbol_file("viewer_hvk.zip"));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(SymbolMatcher::with_patterns(&["[unclosed"]).is_err());
    }
}
