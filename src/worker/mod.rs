//! Workers: capability groups and the standalone task runner
//!
//! A [`WorkerConfig`] declares a named capability group — description,
//! instruction, state callback, and an action space of functions — that an
//! [`Agent`](crate::agent::Agent) registers with the planner. A [`Worker`]
//! is the standalone flavor: it owns a single action space and runs
//! planner-directed tasks by itself, without an orchestrating agent.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::actions::{ActionResponse, ActionSpace, ActionType, FunctionDef, FunctionResult};
use crate::api::Planner;
use crate::core::state::with_instructions;
use crate::core::{SdkError, SdkResult, State, StateFn};

/// Name under which standalone workers register themselves with the service
pub const STANDALONE_WORKER_NAME: &str = "StandaloneWorker";

/// Configuration for a worker owned by an agent
///
/// ```ignore
/// let config = WorkerConfig::new("search_worker", "Searches for information", get_state, functions)
///     .with_instruction("Search efficiently");
/// ```
pub struct WorkerConfig {
    /// Unique identifier for the worker
    pub id: String,

    /// Description of the worker's capabilities
    pub description: String,

    /// Additional instructions for the worker
    pub instruction: String,

    /// Functions this worker exposes
    pub action_space: ActionSpace,

    get_state_fn: StateFn,
}

impl WorkerConfig {
    /// Create a new worker configuration
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        get_state_fn: StateFn,
        action_space: impl Into<ActionSpace>,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            instruction: String::new(),
            action_space: action_space.into(),
            get_state_fn,
        }
    }

    /// Set the worker's instruction text
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// The state callback with the worker's instruction injected
    pub fn state_fn(&self) -> StateFn {
        with_instructions(self.instruction.clone(), Arc::clone(&self.get_state_fn))
    }

    /// The integrator's raw state callback, without instruction injection
    pub(crate) fn raw_state_fn(&self) -> StateFn {
        Arc::clone(&self.get_state_fn)
    }

    /// The wire-visible definition of this worker
    pub fn definition(&self) -> WorkerDef {
        WorkerDef {
            id: self.id.clone(),
            description: self.description.clone(),
            instruction: self.instruction.clone(),
            action_space: self.action_space.definitions(),
        }
    }
}

impl fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("instruction", &self.instruction)
            .field("action_space", &self.action_space.names())
            .finish()
    }
}

/// Wire-visible definition of a worker, as shipped to the planner
#[derive(Debug, Clone, Serialize)]
pub struct WorkerDef {
    /// Worker identifier
    pub id: String,

    /// Description of the worker's capabilities
    pub description: String,

    /// Additional instructions for the worker
    pub instruction: String,

    /// Definitions of the worker's functions
    pub action_space: Vec<FunctionDef>,
}

/// A standalone, task-driven worker
///
/// Registers itself with the planning service and runs one task at a time:
/// the planner picks functions from the worker's action space until it
/// decides the task is done and returns `wait`.
///
/// ```ignore
/// let mut worker = Worker::new(planner, "A weather assistant", "", get_state, functions).await?;
/// worker.run("report the weather in Boston").await?;
/// ```
pub struct Worker {
    planner: Arc<dyn Planner>,
    action_space: ActionSpace,
    get_state_fn: StateFn,
    agent_id: String,
    submission_id: Option<String>,
    state: State,
    function_result: Option<FunctionResult>,
}

impl Worker {
    /// Create a standalone worker and register it with the service
    pub async fn new(
        planner: Arc<dyn Planner>,
        description: impl Into<String>,
        instruction: impl Into<String>,
        get_state_fn: StateFn,
        action_space: impl Into<ActionSpace>,
    ) -> SdkResult<Self> {
        let description = description.into();
        let action_space = action_space.into();
        if action_space.is_empty() {
            return Err(SdkError::validation("Worker has an empty action space"));
        }

        let get_state_fn = with_instructions(instruction.into(), get_state_fn);
        let state = get_state_fn(None, None);

        let agent_id = planner
            .create_agent(STANDALONE_WORKER_NAME, &description, "")
            .await?;
        tracing::info!("Standalone worker registered as agent {}", agent_id);

        Ok(Self {
            planner,
            action_space,
            get_state_fn,
            agent_id,
            submission_id: None,
            state,
            function_result: None,
        })
    }

    /// Materialize a standalone worker from an agent's worker configuration
    pub(crate) async fn from_config(
        planner: Arc<dyn Planner>,
        description: impl Into<String>,
        config: &WorkerConfig,
    ) -> SdkResult<Self> {
        Self::new(
            planner,
            description,
            config.instruction.clone(),
            config.raw_state_fn(),
            config.action_space.clone(),
        )
        .await
    }

    /// The id this worker registered under
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The worker's current state mapping
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Result of the most recently executed function, if any
    pub fn last_result(&self) -> Option<&FunctionResult> {
        self.function_result.as_ref()
    }

    /// Submit a new task, replacing any task in progress
    pub async fn set_task(&mut self, task: &str) -> SdkResult<()> {
        if task.trim().is_empty() {
            return Err(SdkError::validation("Task cannot be empty"));
        }

        let submission_id = self.planner.create_task(&self.agent_id, task).await?;
        tracing::info!("Task set: {} (submission {})", task, submission_id);

        self.submission_id = Some(submission_id);
        self.function_result = None;
        Ok(())
    }

    /// Payload for the next-action request
    fn action_payload(&self) -> Value {
        json!({
            "environment": self.state,
            "functions": self.action_space.definitions(),
            "action_result": self.function_result,
        })
    }

    /// Take one step on the current task
    ///
    /// Fetches the next action from the planner, executes it locally, and
    /// runs the state callback on the outcome. Returns the action type so
    /// callers can detect task completion (`Wait`).
    pub async fn step(&mut self) -> SdkResult<ActionType> {
        let submission_id = self
            .submission_id
            .clone()
            .ok_or_else(|| SdkError::state("No task set; call set_task first"))?;

        let payload = self.action_payload();
        let response = self
            .planner
            .next_task_action(&self.agent_id, &submission_id, &payload)
            .await?;

        tracing::debug!("Worker action: {:?}", response.action_type);

        match response.action_type {
            ActionType::CallFunction | ActionType::ContinueFunction => {
                let result = self.execute_response(&response)?;
                self.state = (self.get_state_fn)(Some(&result), Some(&self.state));
                self.function_result = Some(result);
            }
            ActionType::Wait => {
                tracing::info!("Task completed");
            }
            ActionType::GoTo => {
                return Err(SdkError::InvalidResponse(
                    "Standalone workers cannot go_to another location".into(),
                ));
            }
        }

        Ok(response.action_type)
    }

    /// Run a task to completion
    pub async fn run(&mut self, task: &str) -> SdkResult<()> {
        self.set_task(task).await?;
        while self.step().await? != ActionType::Wait {}
        Ok(())
    }

    /// Execute a function from the action space directly, without the planner
    ///
    /// Runs the function and the state callback exactly as a planner-chosen
    /// step would. Useful for exercising an action space during development.
    pub fn execute_action(
        &mut self,
        fn_name: &str,
        args: &Map<String, Value>,
    ) -> SdkResult<FunctionResult> {
        let function = self
            .action_space
            .get(fn_name)
            .ok_or_else(|| SdkError::state(format!("Unknown function: {}", fn_name)))?;

        let result = function.execute("", args);
        self.state = (self.get_state_fn)(Some(&result), Some(&self.state));
        self.function_result = Some(result.clone());
        Ok(result)
    }

    /// Execute the function chosen by the planner
    fn execute_response(&self, response: &ActionResponse) -> SdkResult<FunctionResult> {
        let fn_name = response
            .fn_name()
            .ok_or_else(|| SdkError::state("No function information provided by GAME"))?;

        let function = self
            .action_space
            .get(fn_name)
            .ok_or_else(|| SdkError::state(format!("Unknown function: {}", fn_name)))?;

        tracing::info!("Executing function: {}", fn_name);
        let result = function.execute(response.action_id(), &response.fn_args());
        tracing::debug!("Feedback: {}", result.feedback_message);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Argument, Function, FunctionResultStatus};
    use crate::core::state_fn;
    use serde_json::Map;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Planner that replays a fixed script of action responses
    struct ScriptedPlanner {
        responses: Mutex<VecDeque<ActionResponse>>,
        payloads: Mutex<Vec<Value>>,
    }

    impl ScriptedPlanner {
        fn new(responses: Vec<ActionResponse>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                payloads: Mutex::new(Vec::new()),
            })
        }

        fn next(&self) -> SdkResult<ActionResponse> {
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| SdkError::state("script exhausted"))
        }
    }

    #[async_trait::async_trait]
    impl Planner for ScriptedPlanner {
        async fn create_agent(&self, _: &str, _: &str, _: &str) -> SdkResult<String> {
            Ok("agent-1".into())
        }

        async fn create_worker_map(&self, _: &[WorkerDef]) -> SdkResult<String> {
            Ok("map-1".into())
        }

        async fn next_agent_action(&self, _: &str, payload: &Value) -> SdkResult<ActionResponse> {
            self.payloads.lock().unwrap().push(payload.clone());
            self.next()
        }

        async fn create_task(&self, _: &str, _: &str) -> SdkResult<String> {
            Ok("submission-1".into())
        }

        async fn next_task_action(
            &self,
            _: &str,
            _: &str,
            payload: &Value,
        ) -> SdkResult<ActionResponse> {
            self.payloads.lock().unwrap().push(payload.clone());
            self.next()
        }
    }

    fn call(fn_name: &str) -> ActionResponse {
        serde_json::from_value(json!({
            "action_type": "call_function",
            "action_args": {"id": "a-1", "fn_name": fn_name, "args": {}}
        }))
        .unwrap()
    }

    fn wait() -> ActionResponse {
        serde_json::from_value(json!({"action_type": "wait"})).unwrap()
    }

    fn counting_state_fn() -> StateFn {
        state_fn(|result, state| {
            let prev = state
                .and_then(|s| s.get("executed"))
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            let mut next = State::new();
            let executed = if result.is_some() { prev + 1 } else { prev };
            next.insert("executed".into(), executed.into());
            next
        })
    }

    fn ping_function() -> Function {
        Function::new(
            "ping",
            "Reply with pong",
            vec![Argument::new("target", "Where to ping").optional()],
            |_args| Ok((FunctionResultStatus::Done, "pong".into(), Map::new())),
        )
    }

    async fn test_worker(planner: Arc<ScriptedPlanner>) -> Worker {
        Worker::new(
            planner,
            "A test worker",
            "be quick",
            counting_state_fn(),
            vec![ping_function()],
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_new_rejects_empty_action_space() {
        let planner = ScriptedPlanner::new(vec![]);
        let result = Worker::new(
            planner,
            "A test worker",
            "",
            counting_state_fn(),
            Vec::<Function>::new(),
        )
        .await;

        assert!(matches!(result, Err(SdkError::Validation(_))));
    }

    #[tokio::test]
    async fn test_initial_state_includes_instructions() {
        let planner = ScriptedPlanner::new(vec![]);
        let worker = test_worker(planner).await;

        assert_eq!(
            worker.state().get("instructions"),
            Some(&Value::from("be quick"))
        );
        assert_eq!(worker.state().get("executed"), Some(&Value::from(0)));
    }

    #[tokio::test]
    async fn test_step_without_task_errors() {
        let planner = ScriptedPlanner::new(vec![wait()]);
        let mut worker = test_worker(planner).await;

        assert!(matches!(worker.step().await, Err(SdkError::State(_))));
    }

    #[tokio::test]
    async fn test_set_task_rejects_empty() {
        let planner = ScriptedPlanner::new(vec![]);
        let mut worker = test_worker(planner).await;

        assert!(matches!(
            worker.set_task("  ").await,
            Err(SdkError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_run_until_wait() {
        let planner = ScriptedPlanner::new(vec![call("ping"), call("ping"), wait()]);
        let mut worker = test_worker(Arc::clone(&planner)).await;

        worker.run("ping twice").await.unwrap();

        assert_eq!(worker.state().get("executed"), Some(&Value::from(2)));
        let last = worker.last_result().unwrap();
        assert_eq!(last.action_status, FunctionResultStatus::Done);
        assert_eq!(last.feedback_message, "pong");

        // Three next-action payloads were sent; the first carries no result
        let payloads = planner.payloads.lock().unwrap();
        assert_eq!(payloads.len(), 3);
        assert!(payloads[0]["action_result"].is_null());
        assert_eq!(payloads[1]["action_result"]["feedback_message"], "pong");
        assert!(payloads[0]["functions"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_function_is_state_error() {
        let planner = ScriptedPlanner::new(vec![call("missing")]);
        let mut worker = test_worker(planner).await;
        worker.set_task("do something").await.unwrap();

        assert!(matches!(worker.step().await, Err(SdkError::State(_))));
    }

    #[tokio::test]
    async fn test_go_to_rejected_for_standalone_worker() {
        let go_to: ActionResponse = serde_json::from_value(json!({
            "action_type": "go_to",
            "action_args": {"location_id": "elsewhere"}
        }))
        .unwrap();
        let planner = ScriptedPlanner::new(vec![go_to]);
        let mut worker = test_worker(planner).await;
        worker.set_task("wander").await.unwrap();

        assert!(matches!(
            worker.step().await,
            Err(SdkError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_action_directly() {
        let planner = ScriptedPlanner::new(vec![]);
        let mut worker = test_worker(planner).await;

        let result = worker.execute_action("ping", &Map::new()).unwrap();
        assert_eq!(result.action_status, FunctionResultStatus::Done);
        assert_eq!(result.feedback_message, "pong");

        // State callback ran, same as for a planner-chosen step
        assert_eq!(worker.state().get("executed"), Some(&Value::from(1)));

        assert!(matches!(
            worker.execute_action("missing", &Map::new()),
            Err(SdkError::State(_))
        ));
    }

    #[test]
    fn test_worker_def_serialization() {
        let config = WorkerConfig::new(
            "search_worker",
            "Searches for information",
            counting_state_fn(),
            vec![ping_function()],
        )
        .with_instruction("Search efficiently");

        let def = serde_json::to_value(config.definition()).unwrap();
        assert_eq!(def["id"], "search_worker");
        assert_eq!(def["description"], "Searches for information");
        assert_eq!(def["instruction"], "Search efficiently");
        assert_eq!(def["action_space"][0]["fn_name"], "ping");
    }
}
