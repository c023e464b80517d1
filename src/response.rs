//! Standard response envelope: the `{code, message, data}` shape returned by
//! every mutating operation.

use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    /// Status code of the operation itself. May differ from the HTTP status:
    /// a no-change update carries 304 inside an HTTP 200 response.
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Envelope {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Envelope carrying a payload. Serialization failures are a programming
    /// error in the payload type; they surface as a 500 envelope.
    pub fn with_data<T: Serialize>(code: u16, message: impl Into<String>, data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Envelope {
                code,
                message: message.into(),
                data: Some(value),
            },
            Err(e) => Envelope::new(500, format!("failed to serialize response data: {}", e)),
        }
    }

    /// True for the 2xx range, or for any code explicitly whitelisted by the
    /// caller (e.g. 304 so "no changes" counts as success).
    pub fn is_success(&self, extra: &[u16]) -> bool {
        (200..300).contains(&self.code) || extra.contains(&self.code)
    }

    /// Map to an HTTP response: success (including whitelisted codes) is sent
    /// as 200 with the envelope as body; anything else uses the envelope code
    /// as the HTTP status.
    pub fn into_http(self, extra: &[u16]) -> (StatusCode, Json<Envelope>) {
        let status = if self.is_success(extra) {
            StatusCode::OK
        } else {
            StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        };
        (status, Json(self))
    }
}
