//! Pipeline orchestration
//!
//! One run processes one input directory:
//! - Unpack every artifact archive into the hosted tree
//! - Per classification: restructure, aggregate, then report and notify
//!
//! Phases are strictly sequential. Per-item failures are logged inside each
//! stage; a missing classification root ends the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::aggregate::{aggregate_group, AggregateSummary};
use crate::config::{ConfigError, ReleaseConfig};
use crate::notify::{
    deliver_chunks, MessageSink, Notifier, NotifyError, NotifySummary, SinkError,
    VersionManagerTransport,
};
use crate::registry::{BuildGroup, BuildRegistry};
use crate::report::{chunk_report, format_report};
use crate::restructure::{restructure_group, RestructureError, RestructureSummary, SymbolMatcher};
use crate::unpack::{UnpackError, UnpackSummary, Unpacker};

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("unpack error: {0}")]
    Unpack(#[from] UnpackError),

    #[error("restructuring {classification} failed: {source}")]
    Restructure {
        classification: String,
        #[source]
        source: RestructureError,
    },

    #[error("symbol pattern error: {0}")]
    SymbolPatterns(#[from] globset::Error),

    #[error("notifier error: {0}")]
    Notify(#[from] NotifyError),

    #[error("webhook error: {0}")]
    Sink(#[from] SinkError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::Config(_) => 2,
            PipelineError::Unpack(_) => 3,
            PipelineError::Restructure { .. } => 4,
            PipelineError::SymbolPatterns(_) => 2,
            PipelineError::Notify(_) => 5,
            PipelineError::Sink(_) => 5,
            PipelineError::Serialization(_) => 1,
        }
    }
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Where a group's report and notices go
pub struct Publisher<'a, T: VersionManagerTransport> {
    /// Each sink receives every chunk of every report
    pub sinks: Vec<&'a dyn MessageSink>,
    /// Version-manager notifier, when notification is enabled
    pub notifier: Option<Notifier<'a, T>>,
}

/// What happened to one classification
#[derive(Debug)]
pub struct GroupSummary {
    pub classification: String,
    pub restructure: RestructureSummary,
    pub aggregate: AggregateSummary,
    /// Report chunks produced
    pub chunks: usize,
    /// Chunks delivered, per sink
    pub delivered: Vec<usize>,
    pub notify: Option<NotifySummary>,
}

/// Outcome of a full run
#[derive(Debug)]
pub struct RunSummary {
    pub registry: BuildRegistry,
    pub unpack: UnpackSummary,
    pub groups: Vec<GroupSummary>,
}

/// Drives the stages over one input directory
pub struct Pipeline<'a> {
    config: &'a ReleaseConfig,
    output_root: PathBuf,
    symbols: SymbolMatcher,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ReleaseConfig, output_root: impl Into<PathBuf>) -> PipelineResult<Self> {
        Ok(Self {
            config,
            output_root: output_root.into(),
            symbols: SymbolMatcher::new()?,
        })
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Unpack phase
    pub fn unpack(&self, input_dir: &Path) -> PipelineResult<(BuildRegistry, UnpackSummary)> {
        let mut registry = BuildRegistry::new();
        let summary = Unpacker::new(self.config, &self.output_root).unpack_dir(input_dir, &mut registry)?;

        log::info!(
            "unpack complete: {} unpacked, {} skipped, {} classification(s)",
            summary.unpacked.len(),
            summary.skipped.len(),
            registry.len()
        );

        Ok((registry, summary))
    }

    /// Restructure then aggregate one group
    pub fn prepare_group(
        &self,
        group: &mut BuildGroup,
    ) -> PipelineResult<(RestructureSummary, AggregateSummary)> {
        let restructure =
            restructure_group(group, &self.symbols).map_err(|source| PipelineError::Restructure {
                classification: group.classification.clone(),
                source,
            })?;
        let aggregate = aggregate_group(group, self.config);
        Ok((restructure, aggregate))
    }

    /// Render, chunk and deliver a group's report, then notify
    pub fn publish_group<T: VersionManagerTransport>(
        &self,
        group: &BuildGroup,
        publisher: &Publisher<'_, T>,
    ) -> (usize, Vec<usize>, Option<NotifySummary>) {
        let report = format_report(group, self.config);
        let chunks = chunk_report(&report, self.config.message_max_length);

        let delivered = publisher
            .sinks
            .iter()
            .map(|sink| deliver_chunks(*sink, &chunks))
            .collect();

        let notify = publisher
            .notifier
            .as_ref()
            .map(|notifier| notifier.notify_group(group));

        (chunks.len(), delivered, notify)
    }

    /// Full run over `input_dir`
    ///
    /// With no publisher the registry is built but nothing is sent.
    pub fn run<T: VersionManagerTransport>(
        &self,
        input_dir: &Path,
        publisher: Option<&Publisher<'_, T>>,
    ) -> PipelineResult<RunSummary> {
        let (mut registry, unpack) = self.unpack(input_dir)?;
        let mut groups = Vec::with_capacity(registry.len());

        for group in registry.groups_mut() {
            log::info!("processing {}", group.classification);
            let (restructure, aggregate) = self.prepare_group(group)?;

            let (chunks, delivered, notify) = match publisher {
                Some(publisher) => self.publish_group(group, publisher),
                None => (0, Vec::new(), None),
            };

            groups.push(GroupSummary {
                classification: group.classification.clone(),
                restructure,
                aggregate,
                chunks,
                delivered,
                notify,
            });
        }

        Ok(RunSummary {
            registry,
            unpack,
            groups,
        })
    }
}
