//! Transport handle shared by every call a client makes.

use std::time::Duration;

use reqwest::{Proxy, Request, Response, Url};
use tracing::debug;

use super::error::LlmError;
use crate::provider::constants::anthropic::CLIENT_ID;

/// Transport tuning applied when the underlying `reqwest::Client` is built.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Whole-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    /// Route every request through this proxy.
    pub proxy: Option<Url>,
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            connect_timeout: None,
            proxy: None,
            user_agent: CLIENT_ID.to_string(),
        }
    }
}

/// Thin wrapper over `reqwest::Client` that remembers how it was built, so
/// it can be rebuilt when the proxy changes.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Build a transport from the given configuration.
    ///
    /// The request timeout is not baked into the client; callers apply it per
    /// request so it can change without a rebuild.
    pub fn new(config: HttpClientConfig) -> Result<Self, LlmError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());

        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }

        if let Some(proxy) = &config.proxy {
            let proxy = Proxy::all(proxy.clone())
                .map_err(|e| LlmError::Config(format!("Invalid proxy {proxy}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("Failed to build reqwest client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Wrap a caller-owned client. It is used as-is until the proxy changes.
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self {
            client,
            config: HttpClientConfig::default(),
        }
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// A new transport identical to this one except for the proxy.
    pub fn with_proxy(&self, proxy: Url) -> Result<Self, LlmError> {
        let config = HttpClientConfig {
            proxy: Some(proxy),
            ..self.config.clone()
        };
        Self::new(config)
    }

    #[tracing::instrument(
        name = "http_execute",
        skip(self, request),
        fields(method = %request.method(), url = %request.url()),
        err
    )]
    pub async fn execute(&self, request: Request) -> Result<Response, LlmError> {
        let response = self.client.execute(request).await?;
        debug!(status = %response.status(), "HTTP response received");
        Ok(response)
    }
}
