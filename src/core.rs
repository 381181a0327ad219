pub mod api_key;
pub mod context;
pub mod error;
pub mod http;
pub mod types;

pub use api_key::{ApiKey, load_api_key_from_env};
pub use context::Context;
pub use error::{ErrorHandler, LlmError, error_from_body};
pub use http::{HttpClient, HttpClientConfig};
pub use types::{CompletionRequest, CompletionResponse, Destination, Parameters, format_prompt};
