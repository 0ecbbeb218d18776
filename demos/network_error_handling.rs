//! Network error handling example
//!
//! Shows how the SDK's error taxonomy separates transient conditions (rate
//! limits, server errors, network failures) from permanent ones
//! (authentication, validation), and how to layer an application-level retry
//! on top of the client's built-in one.
//!
//! Run with:
//!   GAME_API_KEY=your_key cargo run --example network_error_handling

use anyhow::Result;
use std::env;
use std::sync::Arc;
use std::time::Duration;

use game_agent_sdk::{state_fn, Agent, GameClient, SdkConfig, SdkError, State};

async fn create_agent_with_retries(
    planner: Arc<GameClient>,
    max_retries: u32,
) -> Result<Agent, SdkError> {
    let mut attempt = 0;
    loop {
        let result = Agent::new(
            Arc::clone(&planner) as Arc<dyn game_agent_sdk::Planner>,
            "Network Test Agent",
            "Demonstrate network resilience",
            "Testing network error handling",
            state_fn(|_result, _state| {
                let mut state = State::new();
                state.insert("status".into(), "ready".into());
                state
            }),
        )
        .await;

        match result {
            Ok(agent) => {
                println!("Successfully created agent {}", agent.agent_id());
                return Ok(agent);
            }
            Err(e) if e.is_transient() && attempt < max_retries => {
                let delay = e.suggested_delay(attempt);
                println!(
                    "Transient error (attempt {}/{}): {}. Waiting {:?} before retrying.",
                    attempt + 1,
                    max_retries,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                match &e {
                    SdkError::Authentication(_) => {
                        println!("Authentication failed - check your API key: {}", e)
                    }
                    SdkError::Validation(_) => {
                        println!("Validation failed - check the agent configuration: {}", e)
                    }
                    SdkError::RateLimited { .. } => {
                        println!("Still rate limited after {} retries: {}", max_retries, e)
                    }
                    _ => println!("Giving up: {}", e),
                }
                return Err(e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "network_error_handling=info,game_agent_sdk=debug".to_string()),
        )
        .init();

    let api_key = env::var("GAME_API_KEY").unwrap_or_else(|_| "your_api_key_here".to_string());

    println!("=== Network Error Handling ===\n");

    // A tight timeout and no client-side retries, so every failure
    // surfaces to the application layer in this demo
    let config = SdkConfig::default()
        .with_request_timeout(Duration::from_secs(5))
        .with_max_retries(0);
    let planner = Arc::new(GameClient::with_config(api_key, config)?);

    match create_agent_with_retries(planner, 3).await {
        Ok(_agent) => println!("\nAgent ready."),
        Err(e) => {
            println!("\nFailed to create agent.");
            if let Some(status) = e.status_code() {
                println!("Last HTTP status: {}", status);
            }
        }
    }

    Ok(())
}
