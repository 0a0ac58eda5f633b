//! Viewer release pipeline
//!
//! Turns the artifact archives produced by a viewer CI run into a hosted
//! download tree, a download list with checksums, and build-availability
//! notices for the version-manager.

pub mod aggregate;
pub mod config;
pub mod notify;
pub mod pipeline;
pub mod registry;
pub mod report;
pub mod restructure;
pub mod unpack;

pub use config::{BuildIdentity, ConfigError, ReleaseConfig};
pub use pipeline::{Pipeline, PipelineError, Publisher, RunSummary};
pub use registry::{ArtifactKey, ArtifactRecord, BuildGroup, BuildRegistry, Grid, Variant};
