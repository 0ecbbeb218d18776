//! Agent session state
//!
//! A session is one interaction context with the planner: a unique id plus
//! the result of the last executed function. Resetting starts a fresh
//! context without rebuilding the agent.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::actions::FunctionResult;

/// Session state for an agent
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session identifier
    pub id: String,

    /// Result of the last executed function
    pub function_result: Option<FunctionResult>,

    /// When this session started
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with a fresh id
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            function_result: None,
            started_at: Utc::now(),
        }
    }

    /// Reset the session: new id, cleared function result
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
