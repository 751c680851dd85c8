//! The immutable, chainable request builder

use std::collections::BTreeMap;
use std::future::IntoFuture;
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;

use crate::chains::RequestId;
use crate::client::ClientCore;
use crate::error::ApiError;
use crate::params::{IntoPath, Params};
use crate::response::ApiResponse;

/// Future returned by [`ApiRequest::send`].
pub type SendFuture = BoxFuture<'static, Result<ApiResponse, ApiError>>;

/// An immutable handle on one parameter snapshot.
///
/// Fluent mutators never mutate `self`; each one merges a single-key delta
/// into a brand-new instance with its own execution identity. Instances
/// forked from the same client share its transport and execution registry
/// but no mutable state of their own.
///
/// Triggering the same instance repeatedly serializes the underlying
/// network calls in trigger order; see [`ApiRequest::send`]. An instance is
/// not `Clone`: execution identity is per-instance.
///
/// # Example
///
/// ```rust,ignore
/// let client = gh_transport_reqwest::api_client(ApiConfig::from_env());
/// let repo = client.request().path(["repos", "rust-lang", "rust"]);
///
/// // `repo` is untouched; each call below forks a new instance.
/// let issues = repo.path("/repos/rust-lang/rust/issues").query([("state", "open")]);
/// let resp = issues.await?;
/// ```
pub struct ApiRequest {
    core: Arc<ClientCore>,
    id: RequestId,
    params: Params,
}

impl ApiRequest {
    pub(crate) fn root(core: Arc<ClientCore>, params: Params) -> ApiRequest {
        ApiRequest {
            core,
            id: RequestId::mint(),
            params,
        }
    }

    /// The snapshot this instance was constructed with.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Fork a new instance with `delta` merged over this instance's params.
    fn fork(&self, delta: Params) -> ApiRequest {
        ApiRequest {
            core: Arc::clone(&self.core),
            id: RequestId::mint(),
            params: self.params.merged(delta),
        }
    }

    /// Set the request path from a `/`-delimited string or a sequence of
    /// segments. Both forms normalize to the same encoded representation.
    pub fn path(&self, path: impl IntoPath) -> ApiRequest {
        self.fork(Params {
            path: Some(path.into_path()),
            ..Params::default()
        })
    }

    /// Replace the query pairs.
    pub fn query<K, V, I>(&self, query: I) -> ApiRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let query: BTreeMap<String, String> = query
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.fork(Params {
            query: Some(query),
            ..Params::default()
        })
    }

    /// Set the request payload.
    pub fn body(&self, body: Value) -> ApiRequest {
        self.fork(Params {
            body: Some(body),
            ..Params::default()
        })
    }

    /// Replace the request headers.
    pub fn headers<K, V, I>(&self, headers: I) -> ApiRequest
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.fork(Params {
            headers: Some(headers),
            ..Params::default()
        })
    }

    /// Toggle attaching the configured token; `false` suppresses it.
    pub fn authorize(&self, authorize: bool) -> ApiRequest {
        self.fork(Params {
            authorize: Some(authorize),
            ..Params::default()
        })
    }

    /// Set the HTTP verb; coerced to uppercase.
    pub fn method(&self, method: impl Into<String>) -> ApiRequest {
        self.fork(Params {
            method: Some(method.into()),
            ..Params::default()
        })
    }

    /// Memoize the first execution outcome of this instance: with `once`
    /// set, every later trigger replays that outcome instead of issuing a
    /// new network call.
    pub fn once(&self, once: bool) -> ApiRequest {
        self.fork(Params {
            once: Some(once),
            ..Params::default()
        })
    }

    /// Trigger execution with this instance's own snapshot.
    ///
    /// Triggers on one instance are strictly FIFO: each waits for the
    /// previous trigger's network call to settle (successfully or not)
    /// before its own call starts. A failed predecessor delays the next
    /// call but never aborts or fails it. Triggers on distinct instances
    /// are fully independent.
    pub fn send(&self) -> SendFuture {
        self.trigger(None)
    }

    /// Trigger execution with `overrides` merged over the snapshot for this
    /// call only; the instance's own snapshot is untouched. On a memoized
    /// (`once`) instance that already ran, overrides are ignored: the
    /// first trigger wins permanently.
    pub fn send_with(&self, overrides: Params) -> SendFuture {
        self.trigger(Some(overrides))
    }

    fn trigger(&self, overrides: Option<Params>) -> SendFuture {
        let once = self.params.once == Some(true);
        let effective = match overrides {
            Some(delta) => self.params.merged(delta),
            None => self.params.clone(),
        };
        let core = Arc::clone(&self.core);
        let slot = self.core.chains.advance(self.id, once, move |prev| {
            async move {
                if let Some(prev) = prev {
                    // Wait for the prior trigger to settle; its outcome is
                    // deliberately discarded so that a failure delays this
                    // execution without aborting it.
                    let _ = prev.await;
                }
                core.execute(effective).await
            }
            .boxed()
            .shared()
        });
        slot.boxed()
    }
}

impl Drop for ApiRequest {
    fn drop(&mut self) {
        // An instance that went out of scope can never be triggered again;
        // its registry slot goes with it. Send futures already handed out
        // hold their own handle on the outcome and settle normally.
        self.core.chains.evict(self.id);
    }
}

/// Awaiting an instance directly is `send()` with no overrides.
impl IntoFuture for &ApiRequest {
    type Output = Result<ApiResponse, ApiError>;
    type IntoFuture = SendFuture;

    fn into_future(self) -> SendFuture {
        self.send()
    }
}

impl IntoFuture for ApiRequest {
    type Output = Result<ApiResponse, ApiError>;
    type IntoFuture = SendFuture;

    fn into_future(self) -> SendFuture {
        self.send()
    }
}
