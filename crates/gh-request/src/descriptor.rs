//! Resolution of a parameter snapshot into a transport-ready request
//!
//! [`resolve`] is a pure function: the same snapshot, configuration, and
//! clock value always produce an identical descriptor. All URL formatting,
//! cache-busting, and header injection happens here, in one place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::config::ApiConfig;
use crate::params::Params;
use crate::transport::DecodeMode;

/// Query key carrying the cache-busting freshness token.
const CACHE_BUST_KEY: &str = "ts";

/// Transport-level request descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Uppercase HTTP verb.
    pub method: String,
    /// Fully-formed URL, query pairs folded in.
    pub url: String,
    pub options: RequestOptions,
}

/// Everything about a request beyond its method and URL.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Request headers, authorization included when applicable.
    pub headers: BTreeMap<String, String>,
    /// Payload to serialize into the request body.
    pub payload: Option<Value>,
    /// Body decoding mode for the transport.
    pub decode: DecodeMode,
}

/// Resolve a parameter snapshot into a request descriptor.
///
/// `now_ms` is the clock value used for the cache-busting token; callers
/// outside of tests pass the current wall-clock milliseconds.
pub fn resolve(params: &Params, config: &ApiConfig, now_ms: i64) -> RequestDescriptor {
    let raw_path = params.path.as_deref().unwrap_or("");
    let (path, embedded_query) = match raw_path.split_once('?') {
        Some((path, query)) => (path, query),
        None => (raw_path, ""),
    };

    // explicit query pairs replace a query string embedded in the path
    let mut query: BTreeMap<String, String> = match &params.query {
        Some(query) => query.clone(),
        None => form_urlencoded::parse(embedded_query.as_bytes())
            .into_owned()
            .collect(),
    };
    if config.cache_bust {
        // freshness token; a caller-supplied key wins
        query
            .entry(CACHE_BUST_KEY.to_string())
            .or_insert_with(|| now_ms.to_string());
    }

    let mut url = if path.contains("://") {
        path.to_string()
    } else if path.is_empty() {
        config.api_url.trim_end_matches('/').to_string()
    } else {
        format!("{}{}", config.api_url.trim_end_matches('/'), path)
    };
    if !query.is_empty() {
        let encoded: String = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(&query)
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }

    let mut headers = BTreeMap::new();
    if params.authorize != Some(false) {
        if let Some(token) = &config.api_token {
            headers.insert("authorization".to_string(), format!("token {token}"));
        }
    }
    if let Some(extra) = &params.headers {
        // caller-supplied headers win over the injected one
        headers.extend(extra.clone());
    }

    RequestDescriptor {
        method: params.method.clone().unwrap_or_else(|| "GET".to_string()),
        url,
        options: RequestOptions {
            headers,
            payload: params.body.clone(),
            decode: config.decode,
        },
    }
}
