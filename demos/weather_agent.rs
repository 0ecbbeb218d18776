//! Weather Reporter - standalone worker example
//!
//! Demonstrates a standalone `Worker` whose action space exposes a single
//! weather-lookup function. The remote planner decides when to call it and
//! with which city; the worker executes locally and reports back.
//!
//! Run with:
//!   GAME_API_KEY=your_key cargo run --example weather_agent

use anyhow::Result;
use std::env;
use std::sync::Arc;

use serde_json::{json, Map};

use game_agent_sdk::{
    state_fn, Argument, Function, FunctionResultStatus, GameClient, State, Worker,
};

/// Weather lookup against a canned dataset (stands in for a real weather API)
fn get_weather(city: &str) -> Option<(i64, &'static str, &'static str)> {
    match city.to_lowercase().as_str() {
        "new york" => Some((18, "cloudy", "a light jacket")),
        "miami" => Some((31, "sunny", "shorts and sunscreen")),
        "boston" => Some((12, "rainy", "a raincoat")),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG").unwrap_or_else(|_| "weather_agent=info,game_agent_sdk=info".to_string()),
        )
        .init();

    let api_key = env::var("GAME_API_KEY").expect("GAME_API_KEY not set");

    println!("=== Weather Reporter Worker ===\n");

    let weather_fn = Function::new(
        "get_weather",
        "Get weather information and clothing recommendations for a city",
        vec![Argument::new(
            "city",
            "The city to get weather information for (New York, Miami, or Boston)",
        )
        .with_type("string")],
        |args| {
            let city = args
                .get("city")
                .and_then(|v| v.as_str())
                .unwrap_or_default();

            match get_weather(city) {
                Some((temperature, condition, clothing)) => {
                    let mut info = Map::new();
                    info.insert("temperature".into(), temperature.into());
                    info.insert("condition".into(), condition.into());
                    Ok((
                        FunctionResultStatus::Done,
                        format!(
                            "It is {}°C and {} in {}. Wear {}.",
                            temperature, condition, city, clothing
                        ),
                        info,
                    ))
                }
                None => Ok((
                    FunctionResultStatus::Failed,
                    format!("No weather data available for {}", city),
                    Map::new(),
                )),
            }
        },
    );

    // Track the last report in worker state so the planner can see it
    let get_state = state_fn(|result, _state| {
        let mut state = State::new();
        let last_report = result
            .map(|r| r.feedback_message.clone())
            .unwrap_or_else(|| "no reports yet".to_string());
        state.insert("last_report".into(), last_report.into());
        state
    });

    let planner = Arc::new(GameClient::new(api_key)?);
    let mut worker = Worker::new(
        planner,
        "A helpful weather assistant that provides weather information and clothing recommendations",
        "Answer weather questions for New York, Miami, and Boston",
        get_state,
        vec![weather_fn],
    )
    .await?;

    println!("Worker registered as {}\n", worker.agent_id());

    for task in [
        "get weather information for New York",
        "get weather information for Miami",
        "get weather information for Boston",
    ] {
        println!("Task: {}", task);
        worker.run(task).await?;
        if let Some(result) = worker.last_result() {
            println!("Result: {}\n", result.feedback_message);
        }
    }

    println!("Final state: {}", json!(worker.state()));
    Ok(())
}
