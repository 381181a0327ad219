//! # anthropic-completions
//!
//! Async client for the Anthropic text-completion endpoint (`POST /v1/complete`).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anthropic_completions::{AnthropicClient, CompletionRequest, Context, format_prompt};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AnthropicClient::from_env(None)?;
//!     let params = CompletionRequest::new("claude-v1", format_prompt("Hello!"), 256).into();
//!
//!     let response = client.completion(&Context::background(), &params).await?;
//!     println!("{}", response.completion);
//!     Ok(())
//! }
//! ```
//!
//! Errors from non-200 responses carry the message the API returned along
//! with the status code; see [`LlmError`].

pub mod core;
pub mod provider;

pub use crate::core::{
    ApiKey, CompletionRequest, CompletionResponse, Context, Destination, ErrorHandler,
    HttpClient, HttpClientConfig, LlmError, Parameters, error_from_body, format_prompt,
    load_api_key_from_env,
};
pub use provider::constants::anthropic::{ASSISTANT_PROMPT, HUMAN_PROMPT};
pub use provider::{AnthropicClient, AnthropicConfig};
pub use tokio_util::sync::CancellationToken;
