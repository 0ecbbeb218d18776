//! GAME Agent SDK
//!
//! Client SDK for building AI agents on top of the remote GAME planning
//! service. The crate defines the local data model — [`agent::Agent`],
//! [`worker::WorkerConfig`], [`actions::Function`] — serializes it into HTTP
//! requests, executes the functions the planner chooses, and relays results
//! back. All planning happens server-side; this library does serialization,
//! dispatch, and bookkeeping.

pub mod core;

// HTTP layer and the planner seam
pub mod api;

// SDK configuration
pub mod config;

// Functions, action spaces, and planner responses
pub mod actions;

// Workers and the standalone task runner
pub mod worker;

// The top-level agent orchestrator
pub mod agent;

pub use actions::{
    ActionResponse, ActionSpace, ActionType, Argument, Function, FunctionDef, FunctionResult,
    FunctionResultStatus,
};
pub use agent::{Agent, Session};
pub use api::{GameClient, Planner};
pub use config::SdkConfig;
pub use core::{state_fn, SdkError, SdkResult, State, StateFn};
pub use worker::{Worker, WorkerConfig, WorkerDef};
