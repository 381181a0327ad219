pub mod anthropic {
    pub const API_BASE: &str = "https://api.anthropic.com";
    pub const COMPLETE_ENDPOINT: &str = "/v1/complete";
    pub const API_KEY_ENV_VAR: &str = "ANTHROPIC_API_KEY";
    pub const CLIENT_ID: &str = concat!("anthropic-completions/", env!("CARGO_PKG_VERSION"));

    pub const CLIENT_HEADER: &str = "client";
    pub const API_KEY_HEADER: &str = "x-api-key";

    pub const HUMAN_PROMPT: &str = "\n\nHuman:";
    pub const ASSISTANT_PROMPT: &str = "\n\nAssistant:";
}
