//! Outbound notifications
//!
//! - Version-manager: one JSON notice per downloadable artifact
//! - Webhook: the chunked download list as text messages
//!
//! Both go through small traits so the pipeline can be exercised in-process.

mod version_manager;
mod webhook;

pub use version_manager::{
    HttpReply, HttpTransport, Notifier, NotifyError, NotifySummary, VersionManagerTransport,
};
pub use webhook::{deliver_chunks, MessageSink, SinkError, StdoutSink, WebhookSink};

use std::time::Duration;

/// Timeout applied to every outbound HTTP request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
