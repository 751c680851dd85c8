//! Client configuration and environment sourcing

use crate::params::Params;
use crate::transport::DecodeMode;

/// Default GitHub host.
pub const DEFAULT_HOST: &str = "github.com";

/// REST endpoint for github.com.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration handed to the client factory.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL requests are resolved against. May carry a path prefix.
    pub api_url: String,
    /// Token attached as `authorization: token <token>` unless a request
    /// opts out.
    pub api_token: Option<String>,
    /// Append a freshness token to every query string.
    pub cache_bust: bool,
    /// Reject any response with a status outside `[200, 300)` instead of
    /// passing it through as a normal result.
    pub strict_status: bool,
    /// Body decoding mode handed to the transport.
    pub decode: DecodeMode,
    /// Parameters every request forked from this client starts from.
    pub defaults: Params,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            cache_bust: false,
            strict_status: false,
            decode: DecodeMode::Json,
            defaults: Params {
                method: Some("GET".to_string()),
                ..Params::default()
            },
        }
    }
}

impl ApiConfig {
    /// Configuration for a GitHub host.
    ///
    /// `github.com` (or `None`) maps to the public API endpoint; any other
    /// host to the GitHub Enterprise layout `https://{host}/api/v3`.
    pub fn for_host(host: Option<&str>) -> ApiConfig {
        let host = host.unwrap_or(DEFAULT_HOST);
        let api_url = if host == DEFAULT_HOST {
            DEFAULT_API_URL.to_string()
        } else {
            format!("https://{host}/api/v3")
        };
        ApiConfig {
            api_url,
            ..ApiConfig::default()
        }
    }

    /// Configuration from the environment.
    ///
    /// Loads `.env` when present, then reads `GITHUB_API_URL` (falling back
    /// to the public endpoint) and the first of `GITHUB_TOKEN` / `GH_TOKEN`.
    pub fn from_env() -> ApiConfig {
        dotenvy::dotenv().ok();

        let api_url =
            std::env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let api_token = std::env::var("GITHUB_TOKEN")
            .or_else(|_| std::env::var("GH_TOKEN"))
            .ok();
        match &api_token {
            Some(_) => log::debug!("using API token from environment"),
            None => log::debug!("no API token configured; requests go out unauthenticated"),
        }

        ApiConfig {
            api_url,
            api_token,
            ..ApiConfig::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> ApiConfig {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_cache_bust(mut self, cache_bust: bool) -> ApiConfig {
        self.cache_bust = cache_bust;
        self
    }

    pub fn with_strict_status(mut self, strict_status: bool) -> ApiConfig {
        self.strict_status = strict_status;
        self
    }

    pub fn with_decode(mut self, decode: DecodeMode) -> ApiConfig {
        self.decode = decode;
        self
    }

    pub fn with_defaults(mut self, defaults: Params) -> ApiConfig {
        self.defaults = defaults;
        self
    }
}
