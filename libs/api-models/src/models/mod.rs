//! API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status code the backend reports for a ready (successfully deployed) record
pub const STATUS_READY: i64 = 0;

/// A lambda instance as returned by `/api/lambda-instances/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaInstance {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// `0` when ready; any other value is pending or failed
    pub status_code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LambdaInstance {
    pub fn is_ready(&self) -> bool {
        self.status_code == STATUS_READY
    }
}

/// An uploaded lambda application
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambdaApplication {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub status_code: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// List envelope: `{ "data": [...] }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
}

/// Error envelope: `{ "errors": [ { "detail": "..." } ] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub errors: Vec<ErrorDetail>,
}

/// A single entry of an error envelope.
///
/// The console surfaces `detail`; some backend endpoints only fill
/// `message` (with an empty `details`), so both are accepted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// First `detail` of the envelope, if any
    pub fn first_detail(&self) -> Option<&str> {
        self.errors.first().and_then(|e| e.detail.as_deref())
    }

    /// First human readable text: `detail`, falling back to `message`
    pub fn first_text(&self) -> Option<&str> {
        let first = self.errors.first()?;
        first
            .detail
            .as_deref()
            .filter(|d| !d.is_empty())
            .or_else(|| first.message.as_deref().filter(|m| !m.is_empty()))
    }
}
