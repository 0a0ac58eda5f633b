//! Parse errors for artifact names.

/// An archive name that does not follow the artifact naming convention.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed artifact name '{name}': expected at least 6 dash-separated segments, found {found}")]
    TooFewSegments { name: String, found: usize },

    #[error("malformed artifact name '{name}': sixth segment '{found}' is not 'artifacts'")]
    MissingSuffix { name: String, found: String },
}
