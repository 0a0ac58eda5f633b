//! Text message sinks for the download list

use serde_json::json;

use super::HTTP_TIMEOUT;

/// Errors delivering one message
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Destination for report chunks
pub trait MessageSink {
    fn send(&self, text: &str) -> Result<(), SinkError>;
}

/// Posts `{"content": text}` to a chat webhook
pub struct WebhookSink {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: &str) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl MessageSink for WebhookSink {
    fn send(&self, text: &str) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "content": text }))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SinkError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }
        Ok(())
    }
}

/// Writes each message to stdout
pub struct StdoutSink;

impl MessageSink for StdoutSink {
    fn send(&self, text: &str) -> Result<(), SinkError> {
        print!("{}", text);
        Ok(())
    }
}

/// Send every chunk in order; returns how many were delivered
pub fn deliver_chunks(sink: &dyn MessageSink, chunks: &[String]) -> usize {
    let mut delivered = 0;
    for (i, chunk) in chunks.iter().enumerate() {
        match sink.send(chunk) {
            Ok(()) => delivered += 1,
            Err(e) => log::error!("message {}/{} not delivered: {}", i + 1, chunks.len(), e),
        }
    }
    delivered
}
