//! Client for the Anthropic text-completion endpoint.

use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Request, Response, StatusCode, Url};
use tracing::{debug, warn};

use crate::core::{
    ApiKey, CompletionResponse, Context, Destination, ErrorHandler, HttpClient, HttpClientConfig,
    LlmError, Parameters, error_from_body, load_api_key_from_env,
};
use crate::provider::constants::anthropic::{
    API_BASE, API_KEY_HEADER, CLIENT_HEADER, CLIENT_ID, COMPLETE_ENDPOINT,
};

/// Configuration for [`AnthropicClient::from_config`].
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    pub api_key: ApiKey,
    pub base_url: String,
    pub http_config: HttpClientConfig,
    pub debug: bool,
}

impl AnthropicConfig {
    pub fn new(api_key: impl Into<ApiKey>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: API_BASE.to_string(),
            http_config: HttpClientConfig::default(),
            debug: false,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Mutable state, only touched under the client's lock.
#[derive(Debug, Clone)]
struct ClientSettings {
    debug: bool,
    timeout: Option<Duration>,
    http: HttpClient,
}

/// Client for the text-completion API.
///
/// Share it between tasks behind an `Arc`; every call snapshots the current
/// settings, so setters never race with in-flight requests.
#[derive(Debug)]
pub struct AnthropicClient {
    api_key: String,
    base_url: String,
    settings: Mutex<ClientSettings>,
}

impl AnthropicClient {
    /// Create a client with an explicit key. Without a transport a default
    /// one is built.
    pub fn new(transport: Option<reqwest::Client>, api_key: impl Into<String>) -> Self {
        let http = HttpClient::from_reqwest(transport.unwrap_or_default());
        Self::with_parts(api_key.into(), API_BASE.to_string(), http, None, false)
    }

    /// Create a client whose key is read from `ANTHROPIC_API_KEY`.
    pub fn from_env(transport: Option<reqwest::Client>) -> Result<Self, LlmError> {
        let api_key = load_api_key_from_env()?;
        Ok(Self::new(transport, api_key))
    }

    pub fn from_config(config: AnthropicConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.resolve()?;
        let timeout = config.http_config.timeout;
        let http = HttpClient::new(config.http_config)?;
        Ok(Self::with_parts(
            api_key,
            config.base_url,
            http,
            timeout,
            config.debug,
        ))
    }

    fn with_parts(
        api_key: String,
        base_url: String,
        http: HttpClient,
        timeout: Option<Duration>,
        debug: bool,
    ) -> Self {
        Self {
            api_key,
            base_url,
            settings: Mutex::new(ClientSettings {
                debug,
                timeout,
                http,
            }),
        }
    }

    /// Point the client at a different server, e.g. a local mock.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn settings(&self) -> MutexGuard<'_, ClientSettings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_debug(&self, debug: bool) {
        self.settings().debug = debug;
    }

    pub fn debug(&self) -> bool {
        self.settings().debug
    }

    /// Route all later requests through `uri`.
    ///
    /// On error the current transport is kept unchanged.
    pub fn set_proxy(&self, uri: &str) -> Result<(), LlmError> {
        let proxy =
            Url::parse(uri).map_err(|e| LlmError::Config(format!("Invalid proxy {uri:?}: {e}")))?;

        let mut settings = self.settings();
        settings.http = settings.http.with_proxy(proxy)?;
        Ok(())
    }

    /// Bound every later request to `timeout`. `Duration::ZERO` removes the bound.
    pub fn set_timeout(&self, timeout: Duration) {
        self.settings().timeout = (!timeout.is_zero()).then_some(timeout);
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.settings().timeout
    }

    /// Build the `POST /v1/complete` request for `parameters`. Makes no network calls.
    pub fn build_request(&self, parameters: &Parameters) -> Result<Request, LlmError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETE_ENDPOINT);
        let url = Url::parse(&url).map_err(|e| LlmError::InvalidRequest {
            message: format!("Invalid URL {url:?}: {e}"),
        })?;

        let mut api_key =
            HeaderValue::from_str(&self.api_key).map_err(|e| LlmError::InvalidRequest {
                message: format!("API key is not a valid header value: {e}"),
            })?;
        api_key.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CLIENT_HEADER, HeaderValue::from_static(CLIENT_ID));
        headers.insert(API_KEY_HEADER, api_key);
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );

        let mut request = Request::new(Method::POST, url);
        *request.headers_mut() = headers;
        *request.body_mut() = Some(parameters.encode()?.into());
        Ok(request)
    }

    /// Send `request` and decode a 200 response into `destination`.
    pub async fn send(
        &self,
        ctx: &Context,
        request: Request,
        destination: Destination<'_>,
    ) -> Result<(), LlmError> {
        self.send_with_error_handler(ctx, request, destination, &error_from_body)
            .await
    }

    /// Like [`send`](Self::send), but non-200 responses are turned into errors by `handler`.
    pub async fn send_with_error_handler(
        &self,
        ctx: &Context,
        mut request: Request,
        destination: Destination<'_>,
        handler: &dyn ErrorHandler,
    ) -> Result<(), LlmError> {
        let ClientSettings {
            debug,
            timeout,
            http,
        } = self.settings().clone();

        if let Some(timeout) = timeout {
            *request.timeout_mut() = Some(timeout);
        }
        if debug {
            dump_request(&request);
        }

        ctx.run(async {
            let response = http.execute(request).await?;
            handle_response(response, destination, handler).await
        })
        .await
    }

    /// Run one completion call.
    #[tracing::instrument(name = "completion", skip(self, ctx, parameters), err)]
    pub async fn completion(
        &self,
        ctx: &Context,
        parameters: &Parameters,
    ) -> Result<CompletionResponse, LlmError> {
        let request = self.build_request(parameters)?;
        let mut completion = CompletionResponse::default();
        self.send(ctx, request, Destination::Record(&mut completion))
            .await?;
        Ok(completion)
    }

    /// Run one completion call and copy the raw response body into `sink`.
    #[tracing::instrument(name = "completion_raw", skip(self, ctx, parameters, sink), err)]
    pub async fn completion_raw(
        &self,
        ctx: &Context,
        parameters: &Parameters,
        sink: &mut (dyn Write + Send),
    ) -> Result<(), LlmError> {
        let request = self.build_request(parameters)?;
        self.send(ctx, request, Destination::Raw(sink)).await
    }
}

fn dump_request(request: &Request) {
    let body = request
        .body()
        .and_then(reqwest::Body::as_bytes)
        .map(String::from_utf8_lossy)
        .unwrap_or_default();
    debug!(
        method = %request.method(),
        url = %request.url(),
        body = %body,
        "client request"
    );
}

async fn handle_response(
    mut response: Response,
    destination: Destination<'_>,
    handler: &dyn ErrorHandler,
) -> Result<(), LlmError> {
    let status = response.status();
    if status != StatusCode::OK {
        warn!(status = %status, "API returned error status");
        let body = response.bytes().await;
        return Err(handler.handle(status, body));
    }

    match destination {
        Destination::Discard => Ok(()),
        Destination::Raw(sink) => {
            while let Some(chunk) = response.chunk().await? {
                sink.write_all(&chunk)?;
            }
            sink.flush()?;
            Ok(())
        }
        Destination::Record(record) => {
            let body = response.bytes().await?;
            // Only the first JSON value is decoded; anything after it is ignored.
            let parsed = match serde_json::Deserializer::from_slice(&body)
                .into_iter::<CompletionResponse>()
                .next()
            {
                Some(parsed) => parsed,
                None => serde_json::from_slice(&body),
            };
            *record = parsed.map_err(|e| LlmError::Parse {
                message: "Failed to parse completion response".to_string(),
                source: e,
            })?;
            Ok(())
        }
    }
}
