//! State callbacks
//!
//! The SDK never interprets agent or worker state. The integrator supplies a
//! callback that computes the next state mapping from the last function result
//! and the previous state; the SDK calls it synchronously on the caller's
//! thread and ships the resulting mapping to the planner verbatim.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::actions::FunctionResult;

/// An opaque state mapping, produced by the integrator's callback
pub type State = Map<String, Value>;

/// Callback that computes the next state from the last function result and
/// the previous state
///
/// Called with `(None, None)` once at startup to seed the initial state.
pub type StateFn =
    Arc<dyn Fn(Option<&FunctionResult>, Option<&State>) -> State + Send + Sync>;

/// Create a [`StateFn`] from a closure
///
/// # Example
///
/// ```ignore
/// let get_state = state_fn(|_result, _state| {
///     let mut state = State::new();
///     state.insert("status".into(), "ready".into());
///     state
/// });
/// ```
pub fn state_fn<F>(func: F) -> StateFn
where
    F: Fn(Option<&FunctionResult>, Option<&State>) -> State + Send + Sync + 'static,
{
    Arc::new(func)
}

/// Wrap a state callback so the worker's instruction text is injected under
/// an `instructions` key ahead of the integrator's own entries
pub(crate) fn with_instructions(instruction: impl Into<String>, inner: StateFn) -> StateFn {
    let instruction = instruction.into();
    Arc::new(move |function_result, current_state| {
        let mut state = State::new();
        state.insert("instructions".into(), Value::String(instruction.clone()));
        state.extend(inner(function_result, current_state));
        state
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_fn_seeds_initial_state() {
        let get_state = state_fn(|_result, _state| {
            let mut state = State::new();
            state.insert("status".into(), "ready".into());
            state
        });

        let initial = get_state(None, None);
        assert_eq!(initial.get("status"), Some(&Value::from("ready")));
    }

    #[test]
    fn test_with_instructions_injects_key() {
        let inner = state_fn(|_result, _state| {
            let mut state = State::new();
            state.insert("count".into(), 1.into());
            state
        });

        let wrapped = with_instructions("search efficiently", inner);
        let state = wrapped(None, None);

        assert_eq!(
            state.get("instructions"),
            Some(&Value::from("search efficiently"))
        );
        assert_eq!(state.get("count"), Some(&Value::from(1)));
    }

    #[test]
    fn test_integrator_entries_override_injected_key() {
        // An inner callback that sets its own "instructions" wins
        let inner = state_fn(|_result, _state| {
            let mut state = State::new();
            state.insert("instructions".into(), "custom".into());
            state
        });

        let wrapped = with_instructions("default", inner);
        let state = wrapped(None, None);
        assert_eq!(state.get("instructions"), Some(&Value::from("custom")));
    }
}
