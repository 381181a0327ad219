//! Sends one prompt to the completion endpoint and prints the answer.
//!
//! Run with: cargo run --example text-completion -- "Why is the sky blue?"
use std::time::Duration;

use anthropic_completions::{
    AnthropicClient, CompletionRequest, Context, HUMAN_PROMPT, format_prompt,
};
use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let question = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Tell me a random interesting fact about space.".to_string());

    let client = AnthropicClient::from_env(None)?;
    client.set_debug(std::env::var("ANTHROPIC_DEBUG").is_ok());
    client.set_timeout(Duration::from_secs(60));
    if let Ok(proxy) = std::env::var("ANTHROPIC_PROXY") {
        client.set_proxy(&proxy)?;
    }

    let params = CompletionRequest::new("claude-v1", format_prompt(&question), 300)
        .with_stop_sequence(HUMAN_PROMPT)
        .into();

    // Ctrl-C cancels the in-flight request.
    let token = anthropic_completions::CancellationToken::new();
    let ctx = Context::background().with_cancellation(token.clone());
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    match client.completion(&ctx, &params).await {
        Ok(res) => println!("{}", res.completion.trim()),
        Err(e) if e.is_cancellation() => println!("Cancelled"),
        Err(e) => println!("Error: {e}"),
    }

    Ok(())
}
