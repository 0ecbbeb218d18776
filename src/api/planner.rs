//! Planner trait
//!
//! Abstracts the remote GAME planning service so agent and worker logic can
//! be exercised against an in-process implementation in tests. The shipped
//! implementation is [`GameClient`](super::GameClient).

use serde_json::Value;

use crate::actions::ActionResponse;
use crate::core::SdkResult;
use crate::worker::WorkerDef;

/// Remote planning service interface
///
/// All planning happens on the other side of this trait: the local SDK
/// serializes configuration and results in, and receives chosen actions out.
#[async_trait::async_trait]
pub trait Planner: Send + Sync {
    /// Register an agent, returning its id
    async fn create_agent(&self, name: &str, description: &str, goal: &str) -> SdkResult<String>;

    /// Register an agent's workers, returning the worker map id
    async fn create_worker_map(&self, workers: &[WorkerDef]) -> SdkResult<String>;

    /// Ask for the next action in an agent's workflow
    async fn next_agent_action(&self, agent_id: &str, payload: &Value)
        -> SdkResult<ActionResponse>;

    /// Submit a task for a standalone worker, returning the submission id
    async fn create_task(&self, agent_id: &str, task: &str) -> SdkResult<String>;

    /// Ask for the next action on a standalone worker task
    async fn next_task_action(
        &self,
        agent_id: &str,
        submission_id: &str,
        payload: &Value,
    ) -> SdkResult<ActionResponse>;
}
