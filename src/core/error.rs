use bytes::Bytes;
use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    /// Connection failure or transport timeout, passed through as reqwest reported it.
    #[error(transparent)]
    Network(#[from] reqwest::Error),

    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The API answered with a non-200 status.
    #[error("{message}")]
    Api { message: String, status_code: u16 },

    #[error("could not read error response.")]
    ReadErrorBody {
        status_code: u16,
        #[source]
        source: reqwest::Error,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write response body: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{var} not set.")]
    MissingApiKey { var: &'static str },
}

impl LlmError {
    /// HTTP status of the failed response, when the error came from one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            LlmError::Api { status_code, .. } | LlmError::ReadErrorBody { status_code, .. } => {
                Some(*status_code)
            }
            LlmError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Rate limits and server errors are worth another attempt; everything else is fatal.
    pub fn is_retryable(&self) -> bool {
        match self.status_code() {
            Some(code) => code == StatusCode::TOO_MANY_REQUESTS.as_u16() || code >= 500,
            None => matches!(self, LlmError::Network(e) if e.is_timeout() || e.is_connect()),
        }
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, LlmError::Cancelled | LlmError::DeadlineExceeded)
    }
}

/// Turns a non-200 response into the error returned to the caller.
///
/// Implemented for any `Fn(StatusCode, Result<Bytes, reqwest::Error>) -> LlmError`,
/// so plain functions and closures can be passed to
/// [`AnthropicClient::send_with_error_handler`](crate::AnthropicClient::send_with_error_handler).
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, status: StatusCode, body: Result<Bytes, reqwest::Error>) -> LlmError;
}

impl<F> ErrorHandler for F
where
    F: Fn(StatusCode, Result<Bytes, reqwest::Error>) -> LlmError + Send + Sync,
{
    fn handle(&self, status: StatusCode, body: Result<Bytes, reqwest::Error>) -> LlmError {
        self(status, body)
    }
}

/// Default error handler.
///
/// A JSON object body yields its `error` field as the message, empty when the
/// field is missing or null; a bare `null` body also gives an empty message.
/// Anything else yields the body text with surrounding whitespace trimmed.
pub fn error_from_body(status: StatusCode, body: Result<Bytes, reqwest::Error>) -> LlmError {
    let status_code = status.as_u16();
    let body = match body {
        Ok(body) => body,
        Err(source) => {
            return LlmError::ReadErrorBody {
                status_code,
                source,
            };
        }
    };

    let message = match serde_json::from_slice::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Null) => Some(String::new()),
        Ok(serde_json::Value::Object(fields)) => match fields.get("error") {
            None | Some(serde_json::Value::Null) => Some(String::new()),
            Some(serde_json::Value::String(message)) => Some(message.clone()),
            Some(_) => None,
        },
        _ => None,
    };

    LlmError::Api {
        message: message
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string()),
        status_code,
    }
}
