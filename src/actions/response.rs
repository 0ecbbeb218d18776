//! Planner response types
//!
//! Deserialized forms of what the GAME service returns from its action
//! endpoints. Deserialization is tolerant: unknown fields are ignored and
//! optional fields default, since the API surface is not versioned in the
//! response bodies themselves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// What the planner wants the local runtime to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Execute a function from the current worker's action space
    CallFunction,
    /// Keep executing the previously chosen function
    ContinueFunction,
    /// Nothing to do; the current task has ended
    Wait,
    /// Move to a different worker
    GoTo,
}

/// High-level plan state reported by the planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hlp {
    /// Plan identifier
    #[serde(default)]
    pub plan_id: Option<String>,

    /// Planner's reflection on the latest observation
    #[serde(default)]
    pub observation_reflection: Option<String>,

    /// Plan steps
    #[serde(default)]
    pub plan: Vec<String>,

    /// Reasoning behind the plan
    #[serde(default)]
    pub plan_reasoning: Option<String>,

    /// Where execution currently stands
    #[serde(default)]
    pub current_state_of_execution: Option<String>,

    /// Set when the plan changed since the last step
    #[serde(default)]
    pub change_indicator: Option<String>,

    /// Planner log lines
    #[serde(default)]
    pub log: Vec<String>,
}

/// Planner-side view of the agent, included with each action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentStateResponse {
    /// High-level plan, if one exists
    #[serde(default)]
    pub hlp: Option<Hlp>,

    /// The task currently being pursued
    #[serde(default)]
    pub current_task: Option<String>,
}

impl AgentStateResponse {
    /// Check whether the planner generated a new task on this step
    pub fn task_changed(&self) -> bool {
        self.hlp
            .as_ref()
            .map(|hlp| hlp.change_indicator.is_some())
            .unwrap_or(false)
    }
}

/// A single action chosen by the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    /// What kind of action this is
    pub action_type: ActionType,

    /// Planner-side agent state
    #[serde(default)]
    pub agent_state: AgentStateResponse,

    /// Action payload: function name and arguments, or a location id
    #[serde(default)]
    pub action_args: Option<Map<String, Value>>,
}

impl ActionResponse {
    /// Function name for call/continue actions
    pub fn fn_name(&self) -> Option<&str> {
        self.action_args
            .as_ref()
            .and_then(|args| args.get("fn_name"))
            .and_then(|v| v.as_str())
    }

    /// Function arguments for call/continue actions
    pub fn fn_args(&self) -> Map<String, Value> {
        self.action_args
            .as_ref()
            .and_then(|args| args.get("args"))
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default()
    }

    /// Action id for call/continue actions
    pub fn action_id(&self) -> &str {
        self.action_args
            .as_ref()
            .and_then(|args| args.get("id"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    /// Target worker id for go-to actions
    pub fn location_id(&self) -> Option<&str> {
        self.action_args
            .as_ref()
            .and_then(|args| args.get("location_id"))
            .and_then(|v| v.as_str())
    }
}
