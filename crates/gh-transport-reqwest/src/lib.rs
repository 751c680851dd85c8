//! reqwest-backed HTTP transport for `gh-request`
//!
//! The core crate only describes requests; this crate puts them on the
//! wire. [`ReqwestTransport`] maps a [`RequestDescriptor`] onto a
//! [`reqwest::Request`], executes it, and hands back an undecoded
//! [`RawResponse`] with lowercased header names and a body decoded
//! according to the descriptor's [`DecodeMode`].

use std::sync::Arc;

use async_trait::async_trait;
use gh_request::{
    ApiClient, ApiConfig, DecodeMode, HttpTransport, RawResponse, RequestDescriptor,
    TransportError,
};
use log::debug;
use serde_json::Value;

/// Default HTTP transport over a shared [`reqwest::Client`] connection pool.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport over a fresh connection pool.
    pub fn new() -> ReqwestTransport {
        ReqwestTransport {
            client: reqwest::Client::new(),
        }
    }

    /// Transport over an existing client (shared pool, custom TLS, proxies).
    pub fn with_client(client: reqwest::Client) -> ReqwestTransport {
        ReqwestTransport { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<Option<RawResponse>, TransportError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|source| TransportError::dispatch(request, source))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = &request.options.payload {
            builder = builder.json(payload);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| TransportError::dispatch(request, source))?;

        let status = response.status().as_u16();
        // reqwest header names are already lowercase
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let json_content = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("json"));

        let bytes = response.bytes().await.map_err(TransportError::decode)?;
        debug!(
            "{} {} answered {} ({} bytes)",
            request.method,
            request.url,
            status,
            bytes.len()
        );

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            match request.options.decode {
                DecodeMode::Json if json_content => {
                    serde_json::from_slice(&bytes).map_err(TransportError::decode)?
                }
                _ => Value::String(String::from_utf8_lossy(&bytes).into_owned()),
            }
        };

        Ok(Some(RawResponse {
            status,
            headers,
            body,
        }))
    }
}

/// Build a ready-to-use client over the default transport.
pub fn api_client(config: ApiConfig) -> ApiClient {
    ApiClient::new(config, Arc::new(ReqwestTransport::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gh_request::RequestOptions;

    #[tokio::test]
    async fn an_unparseable_method_fails_before_dispatch() {
        let transport = ReqwestTransport::new();
        let request = RequestDescriptor {
            method: "NOT A VERB".to_string(),
            url: "http://localhost/".to_string(),
            options: RequestOptions::default(),
        };

        let error = transport.execute(&request).await.unwrap_err();
        assert!(matches!(error, TransportError::Dispatch { .. }));
    }

    #[test]
    fn the_factory_hands_out_requests_with_the_configured_defaults() {
        let client = api_client(ApiConfig::default());
        let request = client.request();
        assert_eq!(request.params().method.as_deref(), Some("GET"));
    }
}
