//! Error taxonomy surfaced by `send`
//!
//! The scheduler itself only ever raises `InvalidResponse` and `Transport`.
//! `NeedsLogin` and `NeedsPermission` exist as stable classification points
//! so integrators mapping 401/403 responses don't have to invent their own
//! error kinds; [`ApiError::for_status`] is the canonical constructor.

use std::sync::Arc;

use thiserror::Error;

use crate::descriptor::RequestDescriptor;
use crate::response::ApiResponse;
use crate::transport::TransportError;

/// Request descriptor and raw response attached to a failed execution.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    /// The request the failed execution was issued for.
    pub request: RequestDescriptor,
    /// The raw response, when one was received at all.
    pub response: Option<ApiResponse>,
}

/// Failure surfaced by [`ApiRequest::send`](crate::ApiRequest::send).
///
/// Outcomes are replayed through the execution registry, so every variant
/// is `Clone`; the transport source error rides behind an `Arc`.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Response missing, malformed, or outside the accepted status range.
    #[error("invalid response for {} {}", .0.request.method, .0.request.url)]
    InvalidResponse(Box<FailedResponse>),

    /// Authentication required (401-style). Never raised internally.
    #[error("authentication required for {} {}", .0.request.method, .0.request.url)]
    NeedsLogin(Box<FailedResponse>),

    /// Authenticated but not permitted (403-style). Never raised internally.
    #[error("permission denied for {} {}", .0.request.method, .0.request.url)]
    NeedsPermission(Box<FailedResponse>),

    /// The transport itself failed; the source error is passed through
    /// unchanged.
    #[error("transport failure for {} {}", request.method, request.url)]
    Transport {
        request: Box<RequestDescriptor>,
        #[source]
        source: Arc<TransportError>,
    },
}

impl ApiError {
    /// An `InvalidResponse` failure for the given exchange.
    pub fn invalid_response(
        request: RequestDescriptor,
        response: Option<ApiResponse>,
    ) -> ApiError {
        ApiError::InvalidResponse(Box::new(FailedResponse { request, response }))
    }

    /// Classify a settled response by status code: 401 maps to
    /// `NeedsLogin`, 403 to `NeedsPermission`, anything else to
    /// `InvalidResponse`.
    pub fn for_status(request: RequestDescriptor, response: ApiResponse) -> ApiError {
        let status = response.status;
        let failed = Box::new(FailedResponse {
            request,
            response: Some(response),
        });
        match status {
            401 => ApiError::NeedsLogin(failed),
            403 => ApiError::NeedsPermission(failed),
            _ => ApiError::InvalidResponse(failed),
        }
    }

    pub(crate) fn transport(request: RequestDescriptor, source: TransportError) -> ApiError {
        ApiError::Transport {
            request: Box::new(request),
            source: Arc::new(source),
        }
    }

    /// The request descriptor the failed execution was issued for.
    pub fn request(&self) -> &RequestDescriptor {
        match self {
            ApiError::InvalidResponse(failed)
            | ApiError::NeedsLogin(failed)
            | ApiError::NeedsPermission(failed) => &failed.request,
            ApiError::Transport { request, .. } => request,
        }
    }

    /// The raw response, when the failed execution received one.
    pub fn response(&self) -> Option<&ApiResponse> {
        match self {
            ApiError::InvalidResponse(failed)
            | ApiError::NeedsLogin(failed)
            | ApiError::NeedsPermission(failed) => failed.response.as_ref(),
            ApiError::Transport { .. } => None,
        }
    }
}
