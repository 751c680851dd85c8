//! Immutable, chainable GitHub API request builder
//!
//! This crate separates request *description* from request *execution*.
//! Descriptions are immutable: every fluent call forks a new
//! [`ApiRequest`] carrying a merged parameter snapshot, so handles can be
//! shared and specialized freely. Execution is serialized per instance
//! through an identity-keyed registry, with optional run-once memoization.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   ApiClient                      │
//! │   config + transport + execution registry        │
//! └─────────────────────────────────────────────────┘
//!        │ request()
//!        ▼
//! ┌────────────┐  path()/query()/...  ┌────────────┐
//! │ ApiRequest │ ───────────────────▶ │ ApiRequest │  (new instance
//! └────────────┘                      └────────────┘   per fork)
//!        │ send() / .await
//!        ▼
//! ┌─────────────────────────────────────────────────┐
//! │ ExecChains: RequestId → Shared execution future  │
//! │ (FIFO per instance, memoized when `once` is set) │
//! └─────────────────────────────────────────────────┘
//!        │ resolve() → RequestDescriptor
//!        ▼
//! ┌─────────────────────────────────────────────────┐
//! │        HttpTransport (e.g. reqwest-backed)       │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_request::{ApiClient, ApiConfig, HttpTransport};
//! use std::sync::Arc;
//!
//! # async fn example(transport: Arc<dyn HttpTransport>) -> Result<(), gh_request::ApiError> {
//! let client = ApiClient::new(ApiConfig::from_env(), transport);
//!
//! let repo = client.request().path(["repos", "rust-lang", "rust"]);
//! let resp = repo.send().await?;
//! println!("{}: {}", resp.status, resp.body);
//! # Ok(())
//! # }
//! ```

pub mod chains;
pub mod client;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod transport;

pub use chains::RequestId;
pub use client::ApiClient;
pub use config::{ApiConfig, DEFAULT_API_URL, DEFAULT_HOST};
pub use descriptor::{resolve, RequestDescriptor, RequestOptions};
pub use error::{ApiError, FailedResponse};
pub use params::{IntoPath, Params};
pub use request::{ApiRequest, SendFuture};
pub use response::ApiResponse;
pub use transport::{BoxError, DecodeMode, HttpTransport, RawResponse, TransportError};
