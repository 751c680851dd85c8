//! Client factory and the shared execution core

use std::sync::Arc;

use log::debug;

use crate::chains::ExecChains;
use crate::config::ApiConfig;
use crate::descriptor;
use crate::error::ApiError;
use crate::params::Params;
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::transport::HttpTransport;

/// State shared by every request forked from one client: configuration,
/// transport, and the execution registry.
pub(crate) struct ClientCore {
    pub config: ApiConfig,
    pub transport: Arc<dyn HttpTransport>,
    pub chains: ExecChains,
}

impl ClientCore {
    /// Resolve, dispatch, and normalize one execution.
    pub async fn execute(&self, params: Params) -> Result<ApiResponse, ApiError> {
        let request = descriptor::resolve(
            &params,
            &self.config,
            chrono::Utc::now().timestamp_millis(),
        );
        debug!("dispatching {} {}", request.method, request.url);

        let raw = match self.transport.execute(&request).await {
            Ok(raw) => raw,
            Err(source) => return Err(ApiError::transport(request, source)),
        };
        let Some(raw) = raw else {
            debug!("no response for {} {}", request.method, request.url);
            return Err(ApiError::invalid_response(request, None));
        };

        let response = ApiResponse::from_raw(raw);
        debug!(
            "{} {} settled with status {}",
            request.method, request.url, response.status
        );
        if self.config.strict_status && !response.ok {
            return Err(ApiError::invalid_response(request, Some(response)));
        }
        Ok(response)
    }
}

/// Factory handle over one configured client.
///
/// Hands out root [`ApiRequest`] instances sharing this client's
/// configuration, transport, and execution registry. The registry is scoped
/// to the client: requests forked from different clients never interact.
pub struct ApiClient {
    core: Arc<ClientCore>,
}

impl ApiClient {
    /// Create a client from a configuration and a transport.
    ///
    /// `gh-transport-reqwest` provides the batteries-included variant that
    /// wires up the default HTTP transport.
    pub fn new(config: ApiConfig, transport: Arc<dyn HttpTransport>) -> ApiClient {
        ApiClient {
            core: Arc::new(ClientCore {
                config,
                transport,
                chains: ExecChains::default(),
            }),
        }
    }

    /// Mint a root request carrying the configured defaults.
    pub fn request(&self) -> ApiRequest {
        let params = self.core.config.defaults.clone().normalized();
        ApiRequest::root(Arc::clone(&self.core), params)
    }
}
