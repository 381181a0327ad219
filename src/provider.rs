pub(crate) mod anthropic;
pub mod constants;

pub use anthropic::{AnthropicClient, AnthropicConfig};
