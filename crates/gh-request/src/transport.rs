//! Transport boundary
//!
//! The crate never touches the wire itself; everything network-level is
//! delegated to an [`HttpTransport`] implementation. The companion
//! `gh-transport-reqwest` crate ships the default implementation.

use std::collections::HashMap;
use std::error::Error as StdError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::descriptor::RequestDescriptor;

/// Boxed source type for transport failure causes.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// How a transport decodes response bodies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Parse bodies served with a JSON content type; anything else comes
    /// back as a string value.
    #[default]
    Json,
    /// Always return the body as a string value.
    Text,
}

/// Undecoded response handed back by a transport.
///
/// Header names are lowercased by the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Value,
}

/// Transport-level failure, surfaced unchanged through
/// [`ApiError::Transport`](crate::ApiError::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be dispatched.
    #[error("failed to dispatch {method} {url}")]
    Dispatch {
        method: String,
        url: String,
        #[source]
        source: BoxError,
    },

    /// A response arrived but its body could not be decoded.
    #[error("failed to decode response body")]
    Decode(#[source] BoxError),
}

impl TransportError {
    /// Dispatch failure for the given request.
    pub fn dispatch(request: &RequestDescriptor, source: impl Into<BoxError>) -> TransportError {
        TransportError::Dispatch {
            method: request.method.clone(),
            url: request.url.clone(),
            source: source.into(),
        }
    }

    /// Body decoding failure.
    pub fn decode(source: impl Into<BoxError>) -> TransportError {
        TransportError::Decode(source.into())
    }
}

/// External HTTP capability executing one request descriptor.
///
/// Implementations must be `Send + Sync` so a client can be shared across
/// async tasks. Resolving with `Ok(None)` models an exchange that produced
/// no usable response object; the scheduler surfaces that as
/// [`ApiError::InvalidResponse`](crate::ApiError::InvalidResponse).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(
        &self,
        request: &RequestDescriptor,
    ) -> Result<Option<RawResponse>, TransportError>;
}
