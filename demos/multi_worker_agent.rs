//! Multi-worker agent example
//!
//! Builds an agent with two workers — one that gathers facts, one that
//! drafts replies — compiles it, and lets the remote planner drive a few
//! steps. The planner chooses which worker is active and which function
//! runs; this side only executes and keeps state.
//!
//! Run with:
//!   GAME_API_KEY=your_key cargo run --example multi_worker_agent

use anyhow::Result;
use std::env;
use std::sync::Arc;

use serde_json::Map;

use game_agent_sdk::{
    state_fn, Agent, Argument, Function, FunctionResultStatus, GameClient, State, WorkerConfig,
};

fn lookup_fact() -> Function {
    Function::new(
        "lookup_fact",
        "Look up a fact on a topic",
        vec![Argument::new("topic", "Topic to look up").with_type("string")],
        |args| {
            let topic = args.get("topic").and_then(|v| v.as_str()).unwrap_or("?");
            Ok((
                FunctionResultStatus::Done,
                format!("Fact about {}: it exists.", topic),
                Map::new(),
            ))
        },
    )
}

fn send_message() -> Function {
    Function::new(
        "send_message",
        "Send a message to the user",
        vec![
            Argument::new("message", "Message content").with_type("string"),
            Argument::new("priority", "Message priority, 1-5")
                .with_type("integer")
                .optional(),
        ],
        |args| {
            let message = args.get("message").and_then(|v| v.as_str()).unwrap_or("");
            println!(">> {}", message);
            Ok((
                FunctionResultStatus::Done,
                "Message delivered".to_string(),
                Map::new(),
            ))
        },
    )
}

/// Shared shape for both workers: count how many functions have run
fn counting_state() -> game_agent_sdk::StateFn {
    state_fn(|result, state| {
        let prev = state
            .and_then(|s| s.get("actions_taken"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        let mut next = State::new();
        let taken = if result.is_some() { prev + 1 } else { prev };
        next.insert("actions_taken".into(), taken.into());
        next
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "multi_worker_agent=info,game_agent_sdk=info".to_string()),
        )
        .init();

    let api_key = env::var("GAME_API_KEY").expect("GAME_API_KEY not set");

    println!("=== Multi-Worker Agent ===\n");

    let planner = Arc::new(GameClient::new(api_key)?);

    let mut agent = Agent::new(
        planner,
        "Research Assistant",
        "Answer user questions with well-sourced facts",
        "A research assistant that gathers facts and reports them to the user",
        state_fn(|_result, _state| {
            let mut state = State::new();
            state.insert("status".into(), "ready".into());
            state
        }),
    )
    .await?;

    agent.add_worker(
        WorkerConfig::new(
            "research_worker",
            "Gathers facts on requested topics",
            counting_state(),
            vec![lookup_fact()],
        )
        .with_instruction("Prefer primary sources"),
    );
    agent.add_worker(
        WorkerConfig::new(
            "reply_worker",
            "Drafts and sends replies to the user",
            counting_state(),
            vec![send_message()],
        )
        .with_instruction("Keep replies short"),
    );

    let map_id = agent.compile().await?;
    println!("Agent {} compiled (map {})\n", agent.agent_id(), map_id);

    // Let the planner drive a handful of steps
    for step in 1..=5 {
        let response = agent.step().await?;
        println!(
            "step {}: action={:?} worker={:?} task={:?}",
            step,
            response.action_type,
            agent.current_worker_id(),
            response.agent_state.current_task,
        );
    }

    Ok(())
}
