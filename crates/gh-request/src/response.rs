//! Normalized execution outcomes

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::transport::RawResponse;

/// Normalized record produced by a settled execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers, names lowercased.
    pub headers: HashMap<String, String>,
    /// Decoded body.
    pub body: Value,
    /// Whether `status` falls inside `[200, 300)`.
    pub ok: bool,
    /// Value of the `content-type` header, when present.
    pub content_type: Option<String>,
}

impl ApiResponse {
    pub(crate) fn from_raw(raw: RawResponse) -> ApiResponse {
        let ok = (200..300).contains(&raw.status);
        let content_type = raw.headers.get("content-type").cloned();
        ApiResponse {
            status: raw.status,
            headers: raw.headers,
            body: raw.body,
            ok,
            content_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn convenience_fields_are_derived_from_the_raw_response() {
        let raw = RawResponse {
            status: 201,
            headers: HashMap::from([(
                "content-type".to_string(),
                "application/json".to_string(),
            )]),
            body: json!({"created": true}),
        };

        let response = ApiResponse::from_raw(raw);
        assert!(response.ok);
        assert_eq!(response.content_type.as_deref(), Some("application/json"));
    }

    #[test]
    fn out_of_range_statuses_are_not_ok() {
        for status in [199, 304, 404, 500] {
            let raw = RawResponse {
                status,
                headers: HashMap::new(),
                body: Value::Null,
            };
            assert!(!ApiResponse::from_raw(raw).ok, "status {status}");
        }
    }
}
