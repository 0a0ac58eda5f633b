//! Response handling for version-manager calls.

use serde::{Deserialize, Serialize};

/// Value of `result` that marks an accepted notice.
pub const RESULT_SUCCESS: &str = "success";

/// Body returned by the version-manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// `"success"` on acceptance, anything else on rejection.
    pub result: String,
    /// Optional human-readable detail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    /// Whether the API accepted the notice.
    pub fn is_success(&self) -> bool {
        self.result == RESULT_SUCCESS
    }
}

/// Reasons a version-manager reply is not a success.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("request rejected: result={result}, message={message:?}")]
    Rejected {
        result: String,
        message: Option<String>,
    },
}

/// Check an HTTP status and body against the API's success contract.
///
/// Success requires status 200 and a JSON body whose `result` is `"success"`.
pub fn interpret_response(status: u16, body: &str) -> Result<ApiResponse, ResponseError> {
    if status != 200 {
        return Err(ResponseError::HttpStatus {
            status,
            body: body.to_string(),
        });
    }

    let response: ApiResponse = serde_json::from_str(body)?;
    if !response.is_success() {
        return Err(ResponseError::Rejected {
            result: response.result,
            message: response.message,
        });
    }

    Ok(response)
}
