//! Version-manager notifier

use chrono::NaiveDate;
use serde_json::Value;
use version_manager_protocol::{
    auth_token, auth_token_for_today, interpret_response, BuildNotification, ResponseError,
};

use crate::config::BuildIdentity;
use crate::registry::{ArtifactKey, ArtifactRecord, BuildGroup};

use super::HTTP_TIMEOUT;

/// Status and body of an HTTP reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// Errors for one notice
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Posts JSON to the version-manager
pub trait VersionManagerTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, NotifyError>;
}

/// Blocking reqwest transport
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, NotifyError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

impl VersionManagerTransport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<HttpReply, NotifyError> {
        let response = self.client.post(url).json(body).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpReply { status, body })
    }
}

/// Outcome of notifying one build group
#[derive(Debug, Default)]
pub struct NotifySummary {
    /// Keys the version-manager accepted
    pub accepted: Vec<ArtifactKey>,
    /// Keys that failed, with the reason
    pub failed: Vec<(ArtifactKey, String)>,
}

/// Submits every artifact of a build group to the version-manager
pub struct Notifier<'a, T: VersionManagerTransport> {
    transport: &'a T,
    url: String,
    secret: String,
    identity: &'a BuildIdentity,
    token_date: Option<NaiveDate>,
}

impl<'a, T: VersionManagerTransport> Notifier<'a, T> {
    pub fn new(transport: &'a T, url: &str, secret: &str, identity: &'a BuildIdentity) -> Self {
        Self {
            transport,
            url: url.to_string(),
            secret: secret.to_string(),
            identity,
            token_date: None,
        }
    }

    /// Sign with a fixed date instead of today's UTC date
    pub fn with_token_date(mut self, date: NaiveDate) -> Self {
        self.token_date = Some(date);
        self
    }

    fn token(&self) -> String {
        match self.token_date {
            Some(date) => auth_token(&self.secret, date),
            None => auth_token_for_today(&self.secret),
        }
    }

    /// Notice for a single record
    pub fn build_notification(&self, record: &ArtifactRecord) -> BuildNotification {
        BuildNotification {
            secret: self.token(),
            viewer_channel: self.identity.channel.clone(),
            grid_type: record.grid.code().to_string(),
            operating_system: record.external_platform.clone(),
            build_type: record.variant.code().to_string(),
            viewer_version: self.identity.version.clone(),
            build_number: self.identity.build_number,
            download_link: record.download_uri.clone(),
            md5_checksum: record.checksum.clone(),
        }
    }

    /// Submit one record
    pub fn submit(&self, record: &ArtifactRecord) -> Result<(), NotifyError> {
        let body = serde_json::to_value(self.build_notification(record))?;
        let reply = self.transport.post_json(&self.url, &body)?;
        interpret_response(reply.status, &reply.body)?;
        Ok(())
    }

    /// Submit every record of `group`; a failed record does not stop the rest
    pub fn notify_group(&self, group: &BuildGroup) -> NotifySummary {
        let mut summary = NotifySummary::default();

        for (key, record) in &group.downloadable_artifacts {
            match self.submit(record) {
                Ok(()) => {
                    log::info!("version-manager accepted {} {}", group.classification, key);
                    summary.accepted.push(key.clone());
                }
                Err(e) => {
                    log::error!(
                        "version-manager notice for {} {} failed: {}",
                        group.classification,
                        key,
                        e
                    );
                    summary.failed.push((key.clone(), e.to_string()));
                }
            }
        }

        summary
    }
}
