//! The Agent orchestrator
//!
//! An [`Agent`] holds a goal, a description, and a set of workers, and drives
//! the step loop against the remote planner: report the last result, receive
//! the next action, execute it locally, refresh state through the
//! integrator's callbacks, repeat. The planner decides everything — which
//! worker is active, which function runs, with what arguments — the agent
//! only serializes, dispatches, and keeps the books.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::actions::{ActionResponse, ActionType, FunctionResult};
use crate::api::Planner;
use crate::core::{SdkError, SdkResult, State, StateFn};
use crate::worker::{Worker, WorkerConfig, WorkerDef};

use super::session::Session;

/// A goal-driven agent that delegates planning to the GAME service
///
/// ```ignore
/// let planner = Arc::new(GameClient::new(api_key)?);
/// let mut agent = Agent::new(planner, "Support Agent", "Help users", "A helpful agent", get_state).await?;
/// agent.add_worker(worker_config);
/// agent.compile().await?;
/// agent.step().await?;
/// ```
pub struct Agent {
    planner: Arc<dyn Planner>,

    /// Agent name
    pub name: String,

    /// Primary goal of the agent
    pub goal: String,

    /// Description of the agent's capabilities and world
    pub description: String,

    get_agent_state_fn: StateFn,
    workers: Vec<WorkerConfig>,

    agent_id: String,
    map_id: Option<String>,
    current_worker_id: Option<String>,

    agent_state: State,
    worker_states: HashMap<String, State>,
    worker_state_fns: HashMap<String, StateFn>,

    session: Session,
}

impl Agent {
    /// Create an agent and register it with the planning service
    ///
    /// The state callback is invoked once with `(None, None)` to seed the
    /// initial agent state.
    pub async fn new(
        planner: Arc<dyn Planner>,
        name: impl Into<String>,
        goal: impl Into<String>,
        description: impl Into<String>,
        get_agent_state_fn: StateFn,
    ) -> SdkResult<Self> {
        let name = name.into();
        let goal = goal.into();
        let description = description.into();

        if name.trim().is_empty() {
            return Err(SdkError::validation("Name cannot be empty"));
        }

        let agent_state = get_agent_state_fn(None, None);

        let agent_id = planner.create_agent(&name, &description, &goal).await?;
        tracing::info!("Agent {} registered as {}", name, agent_id);

        Ok(Self {
            planner,
            name,
            goal,
            description,
            get_agent_state_fn,
            workers: Vec::new(),
            agent_id,
            map_id: None,
            current_worker_id: None,
            agent_state,
            worker_states: HashMap::new(),
            worker_state_fns: HashMap::new(),
            session: Session::new(),
        })
    }

    /// The id assigned by the planning service
    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// The current session id
    pub fn session_id(&self) -> &str {
        &self.session.id
    }

    /// The agent's current state mapping
    pub fn agent_state(&self) -> &State {
        &self.agent_state
    }

    /// The id of the worker the planner currently has the agent at
    pub fn current_worker_id(&self) -> Option<&str> {
        self.current_worker_id.as_deref()
    }

    /// The current state mapping of a worker
    pub fn worker_state(&self, worker_id: &str) -> Option<&State> {
        self.worker_states.get(worker_id)
    }

    /// Add a worker to the agent
    ///
    /// A worker with the same id replaces the earlier one.
    pub fn add_worker(&mut self, config: WorkerConfig) {
        match self.workers.iter().position(|w| w.id == config.id) {
            Some(idx) => {
                tracing::warn!("Replacing worker: {}", config.id);
                self.workers[idx] = config;
            }
            None => {
                tracing::debug!("Adding worker: {}", config.id);
                self.workers.push(config);
            }
        }
    }

    /// Get a worker configuration by id
    pub fn get_worker_config(&self, worker_id: &str) -> Option<&WorkerConfig> {
        self.workers.iter().find(|w| w.id == worker_id)
    }

    /// Materialize a standalone [`Worker`] from one of this agent's workers
    ///
    /// The worker shares the agent's planner handle and description but runs
    /// tasks independently.
    pub async fn get_worker(&self, worker_id: &str) -> SdkResult<Worker> {
        let config = self
            .get_worker_config(worker_id)
            .ok_or_else(|| SdkError::state(format!("Unknown worker: {}", worker_id)))?;

        Worker::from_config(Arc::clone(&self.planner), self.description.clone(), config).await
    }

    /// Compile the agent: register its workers and seed their states
    ///
    /// The first added worker becomes the agent's starting location.
    /// Returns the worker map id.
    pub async fn compile(&mut self) -> SdkResult<String> {
        if self.workers.is_empty() {
            return Err(SdkError::validation("No workers added to the agent"));
        }
        for worker in &self.workers {
            if worker.id.trim().is_empty() {
                return Err(SdkError::validation("Worker id cannot be empty"));
            }
            if worker.action_space.is_empty() {
                return Err(SdkError::validation(format!(
                    "Worker {} has an empty action space",
                    worker.id
                )));
            }
        }

        let defs: Vec<WorkerDef> = self.workers.iter().map(|w| w.definition()).collect();
        let map_id = self.planner.create_worker_map(&defs).await?;

        self.current_worker_id = Some(self.workers[0].id.clone());

        self.worker_states.clear();
        self.worker_state_fns.clear();
        for worker in &self.workers {
            let state_fn = worker.state_fn();
            self.worker_states
                .insert(worker.id.clone(), state_fn(None, None));
            self.worker_state_fns.insert(worker.id.clone(), state_fn);
        }

        self.map_id = Some(map_id.clone());
        tracing::info!(
            "Agent compiled with {} workers (map {})",
            self.workers.len(),
            map_id
        );
        Ok(map_id)
    }

    /// Reset the agent's session
    pub fn reset(&mut self) {
        self.session.reset();
    }

    /// Payload for the next-action request
    fn action_payload(&self) -> SdkResult<Value> {
        let worker_id = self
            .current_worker_id
            .as_deref()
            .ok_or_else(|| SdkError::state("Agent not compiled; call compile first"))?;
        let map_id = self
            .map_id
            .as_deref()
            .ok_or_else(|| SdkError::state("Agent not compiled; call compile first"))?;

        let environment = self
            .worker_states
            .get(worker_id)
            .ok_or_else(|| SdkError::state(format!("No state for worker {}", worker_id)))?;
        let functions = self
            .get_worker_config(worker_id)
            .map(|w| w.action_space.definitions())
            .ok_or_else(|| SdkError::state(format!("Unknown worker: {}", worker_id)))?;

        // The planner expects a result object even before any function ran
        let current_action = self
            .session
            .function_result
            .clone()
            .unwrap_or_else(FunctionResult::empty);

        Ok(json!({
            "location": worker_id,
            "map_id": map_id,
            "environment": environment,
            "functions": functions,
            "events": {},
            "agent_state": self.agent_state,
            "current_action": current_action,
            "version": "v2",
        }))
    }

    /// Take one step in the agent's workflow
    ///
    /// Asks the planner for the next action, executes it locally, and runs
    /// the worker- and agent-level state callbacks. Returns the planner's
    /// response so callers can inspect the chosen action and plan state.
    pub async fn step(&mut self) -> SdkResult<ActionResponse> {
        let payload = self.action_payload()?;
        let response = self
            .planner
            .next_agent_action(&self.agent_id, &payload)
            .await?;

        tracing::info!(
            "Step: action={:?} task={:?}",
            response.action_type,
            response.agent_state.current_task
        );
        if response.agent_state.task_changed() {
            tracing::info!(
                "New task generated: {:?}",
                response.agent_state.current_task
            );
        }

        match response.action_type {
            ActionType::CallFunction | ActionType::ContinueFunction => {
                self.execute_function(&response)?;
            }
            ActionType::Wait => {
                tracing::info!("Task ended or completed");
            }
            ActionType::GoTo => {
                let next_worker = response
                    .location_id()
                    .ok_or_else(|| SdkError::state("No location information provided by GAME"))?;
                if self.get_worker_config(next_worker).is_none() {
                    return Err(SdkError::state(format!(
                        "Planner selected unknown worker: {}",
                        next_worker
                    )));
                }
                tracing::info!("Next worker selected: {}", next_worker);
                self.current_worker_id = Some(next_worker.to_string());
            }
        }

        self.agent_state = (self.get_agent_state_fn)(
            self.session.function_result.as_ref(),
            Some(&self.agent_state),
        );

        Ok(response)
    }

    /// Run the agent's workflow with a fresh session
    ///
    /// Steps forever; returns only when a step fails.
    pub async fn run(&mut self) -> SdkResult<()> {
        self.session = Session::new();
        loop {
            self.step().await?;
        }
    }

    /// Execute the function chosen by the planner and refresh worker state
    fn execute_function(&mut self, response: &ActionResponse) -> SdkResult<()> {
        let worker_id = self
            .current_worker_id
            .clone()
            .ok_or_else(|| SdkError::state("Agent not compiled; call compile first"))?;

        let fn_name = response
            .fn_name()
            .ok_or_else(|| SdkError::state("No function information provided by GAME"))?;

        let function = self
            .get_worker_config(&worker_id)
            .and_then(|w| w.action_space.get(fn_name))
            .cloned()
            .ok_or_else(|| {
                SdkError::state(format!(
                    "Unknown function {} for worker {}",
                    fn_name, worker_id
                ))
            })?;

        tracing::info!("Executing function: {} (worker {})", fn_name, worker_id);
        let result = function.execute(response.action_id(), &response.fn_args());
        tracing::debug!("Feedback: {}", result.feedback_message);

        let updated = {
            let state_fn = self
                .worker_state_fns
                .get(&worker_id)
                .ok_or_else(|| SdkError::state(format!("No state for worker {}", worker_id)))?;
            state_fn(Some(&result), self.worker_states.get(&worker_id))
        };
        self.worker_states.insert(worker_id, updated);
        self.session.function_result = Some(result);

        Ok(())
    }
}
