use std::collections::BTreeMap;
use std::io::Write;

use serde::{Deserialize, Deserializer, Serialize};

use super::error::LlmError;
use crate::provider::constants::anthropic::{ASSISTANT_PROMPT, HUMAN_PROMPT};

/// Result of a completion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub completion: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stop: String,
    #[serde(deserialize_with = "null_as_default")]
    pub stop_reason: String,
    #[serde(deserialize_with = "null_as_default")]
    pub truncated: bool,
    /// Empty when the API reports no exception.
    #[serde(deserialize_with = "null_as_default")]
    pub exception: String,
    #[serde(deserialize_with = "null_as_default")]
    pub log_id: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Where a successful response body goes.
pub enum Destination<'a> {
    /// Drop the body unread.
    Discard,
    /// Parse the body as JSON into the record.
    Record(&'a mut CompletionResponse),
    /// Copy the body bytes verbatim.
    Raw(&'a mut (dyn Write + Send)),
}

impl std::fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Discard => write!(f, "Discard"),
            Destination::Record(_) => write!(f, "Record"),
            Destination::Raw(_) => write!(f, "Raw"),
        }
    }
}

/// Form parameters for a request. Keys are kept sorted and may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Parameters {
    values: BTreeMap<String, Vec<String>>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every value stored under `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), vec![value.into()]);
        self
    }

    /// Add a value under `key`, keeping existing ones.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.entry(key.into()).or_default().push(value.into());
        self
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(key, value)` pairs in key order, repeated keys in insertion order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// `application/x-www-form-urlencoded` rendering of the parameters.
    pub fn encode(&self) -> Result<String, LlmError> {
        let pairs: Vec<(&str, &str)> = self.pairs().collect();
        serde_urlencoded::to_string(pairs).map_err(|e| LlmError::InvalidRequest {
            message: format!("Failed to encode parameters: {e}"),
        })
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.add(key, value);
        }
        params
    }
}

/// Typed view over the parameters the completion endpoint understands.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens_to_sample: u32,
    pub stop_sequences: Vec<String>,
    pub temperature: Option<f32>,
    pub top_k: Option<i32>,
    pub top_p: Option<f32>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            max_tokens_to_sample: max_tokens,
            stop_sequences: Vec::new(),
            temperature: None,
            top_k: None,
            top_p: None,
        }
    }

    pub fn with_stop_sequence(mut self, stop: impl Into<String>) -> Self {
        self.stop_sequences.push(stop.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_k(mut self, top_k: i32) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }
}

impl From<CompletionRequest> for Parameters {
    fn from(req: CompletionRequest) -> Self {
        let mut params = Parameters::new();
        params
            .set("model", req.model)
            .set("prompt", req.prompt)
            .set("max_tokens_to_sample", req.max_tokens_to_sample.to_string());

        for stop in req.stop_sequences {
            params.add("stop_sequences", stop);
        }
        if let Some(temperature) = req.temperature {
            params.set("temperature", temperature.to_string());
        }
        if let Some(top_k) = req.top_k {
            params.set("top_k", top_k.to_string());
        }
        if let Some(top_p) = req.top_p {
            params.set("top_p", top_p.to_string());
        }
        params
    }
}

/// Wraps a single user turn in the conversation markers the model expects.
pub fn format_prompt(text: &str) -> String {
    format!("{HUMAN_PROMPT} {text}{ASSISTANT_PROMPT}")
}
