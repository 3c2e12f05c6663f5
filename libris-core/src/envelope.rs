//! The uniform response envelope shared by the backend and the gateway.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// `{success, message, data, statusCode, timestamp}` wrapper around every
/// backend payload.
///
/// `data` is `null` on failures, so it is modelled as optional regardless of
/// `T`. The timestamp is kept as text since the backend and the gateway do
/// not agree on its precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub status_code: u16,
    #[serde(default)]
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// A failure envelope with no payload.
    pub fn failure(message: impl Into<String>, status_code: u16, at: DateTime<Utc>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            status_code,
            timestamp: iso_timestamp(at),
        }
    }

    /// Consumes the envelope, yielding the payload only if the call succeeded.
    pub fn into_data(self) -> Option<T> {
        if self.success {
            self.data
        } else {
            None
        }
    }
}

/// Formats `at` as ISO 8601 UTC with millisecond precision and a `Z` suffix.
#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
