use super::error::LlmError;
use crate::provider::constants::anthropic::API_KEY_ENV_VAR;

/// Where the client takes its credential from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKey {
    /// Read `ANTHROPIC_API_KEY` from the environment.
    Default,
    Custom(String),
}

impl ApiKey {
    pub fn resolve(self) -> Result<String, LlmError> {
        match self {
            ApiKey::Default => load_api_key_from_env(),
            ApiKey::Custom(key) => Ok(key),
        }
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        ApiKey::Custom(key)
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        ApiKey::Custom(key.to_string())
    }
}

/// Read the API key from `ANTHROPIC_API_KEY`. Unset and empty are both errors.
pub fn load_api_key_from_env() -> Result<String, LlmError> {
    match std::env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LlmError::MissingApiKey {
            var: API_KEY_ENV_VAR,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_key_resolves_to_itself() {
        assert_eq!(ApiKey::from("sk-test").resolve().unwrap(), "sk-test");
    }

    #[test]
    fn missing_key_names_the_variable() {
        let err = LlmError::MissingApiKey {
            var: API_KEY_ENV_VAR,
        };
        assert_eq!(err.to_string(), "ANTHROPIC_API_KEY not set.");
    }
}
