//! Functions and action spaces
//!
//! A [`Function`] pairs a wire-visible definition (name, description,
//! argument schema) with an executable body supplied by the integrator. The
//! planner only ever sees the definition; execution stays local. An
//! [`ActionSpace`] is the ordered collection of functions a worker exposes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Signature of an integrator-supplied function body
///
/// Receives the argument map chosen by the planner and returns a status, a
/// feedback message for the planner, and an info map kept local for state
/// callbacks. Returning an `Err` is reported to the planner as a failed
/// execution rather than propagated.
pub type Executable = Arc<
    dyn Fn(&Map<String, Value>) -> anyhow::Result<(FunctionResultStatus, String, Map<String, Value>)>
        + Send
        + Sync,
>;

/// Outcome status of a function execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionResultStatus {
    /// Function completed successfully
    Done,
    /// Function failed to complete
    Failed,
}

/// Result of executing a function
///
/// The `info` map is local bookkeeping for state callbacks and is never
/// serialized onto the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResult {
    /// Id of the action this result answers
    pub action_id: String,

    /// Outcome status
    pub action_status: FunctionResultStatus,

    /// Feedback message relayed to the planner
    pub feedback_message: String,

    /// Local-only details, passed to state callbacks
    #[serde(skip_serializing, default)]
    pub info: Map<String, Value>,
}

impl FunctionResult {
    /// Create a successful result
    pub fn done(
        action_id: impl Into<String>,
        feedback_message: impl Into<String>,
        info: Map<String, Value>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            action_status: FunctionResultStatus::Done,
            feedback_message: feedback_message.into(),
            info,
        }
    }

    /// Create a failed result
    pub fn failed(action_id: impl Into<String>, feedback_message: impl Into<String>) -> Self {
        Self {
            action_id: action_id.into(),
            action_status: FunctionResultStatus::Failed,
            feedback_message: feedback_message.into(),
            info: Map::new(),
        }
    }

    /// Placeholder result used before any function has run
    pub fn empty() -> Self {
        Self {
            action_id: String::new(),
            action_status: FunctionResultStatus::Done,
            feedback_message: String::new(),
            info: Map::new(),
        }
    }
}

/// A named, typed argument in a function's parameter schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Argument {
    /// Argument name
    pub name: String,

    /// What the argument means and any constraints on it
    pub description: String,

    /// Argument type (e.g. "string", "integer")
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub arg_type: Option<String>,

    /// Whether the planner may omit this argument
    #[serde(default)]
    pub optional: bool,
}

impl Argument {
    /// Create a new argument with a name and description
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            arg_type: None,
            optional: false,
        }
    }

    /// Set the argument type
    pub fn with_type(mut self, arg_type: impl Into<String>) -> Self {
        self.arg_type = Some(arg_type.into());
        self
    }

    /// Mark the argument as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Wire-visible definition of a function, as shipped to the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDef {
    /// Function name
    pub fn_name: String,

    /// What the function does
    pub fn_description: String,

    /// Parameter schema
    pub args: Vec<Argument>,

    /// Usage hint for the planner (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// A local callable exposed to the remote planner
pub struct Function {
    /// Function name (how the planner refers to it)
    pub fn_name: String,

    /// What the function does
    pub fn_description: String,

    /// Parameter schema
    pub args: Vec<Argument>,

    /// Usage hint for the planner (optional)
    pub hint: Option<String>,

    executable: Executable,
}

impl Function {
    /// Create a new function with an executable body
    pub fn new<F>(
        fn_name: impl Into<String>,
        fn_description: impl Into<String>,
        args: Vec<Argument>,
        executable: F,
    ) -> Self
    where
        F: Fn(&Map<String, Value>) -> anyhow::Result<(FunctionResultStatus, String, Map<String, Value>)>
            + Send
            + Sync
            + 'static,
    {
        Self {
            fn_name: fn_name.into(),
            fn_description: fn_description.into(),
            args,
            hint: None,
            executable: Arc::new(executable),
        }
    }

    /// Set a usage hint for the planner
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// The wire-visible definition of this function
    pub fn definition(&self) -> FunctionDef {
        FunctionDef {
            fn_name: self.fn_name.clone(),
            fn_description: self.fn_description.clone(),
            args: self.args.clone(),
            hint: self.hint.clone(),
        }
    }

    /// Execute the function with planner-chosen arguments
    ///
    /// Argument values arriving as `{"value": ...}` objects are unwrapped
    /// before the body sees them. A body error becomes a failed
    /// [`FunctionResult`] so the planner can react to it.
    pub fn execute(&self, action_id: &str, args: &Map<String, Value>) -> FunctionResult {
        let mut processed = Map::new();
        for (name, value) in args {
            let unwrapped = match value {
                Value::Object(obj) if obj.contains_key("value") => obj["value"].clone(),
                other => other.clone(),
            };
            processed.insert(name.clone(), unwrapped);
        }

        match (self.executable)(&processed) {
            Ok((status, feedback_message, info)) => FunctionResult {
                action_id: action_id.to_string(),
                action_status: status,
                feedback_message,
                info,
            },
            Err(e) => {
                tracing::warn!("Function {} failed: {}", self.fn_name, e);
                FunctionResult::failed(action_id, format!("Error executing function: {}", e))
            }
        }
    }
}

impl Clone for Function {
    fn clone(&self) -> Self {
        Self {
            fn_name: self.fn_name.clone(),
            fn_description: self.fn_description.clone(),
            args: self.args.clone(),
            hint: self.hint.clone(),
            executable: Arc::clone(&self.executable),
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("fn_name", &self.fn_name)
            .field("fn_description", &self.fn_description)
            .field("args", &self.args)
            .field("hint", &self.hint)
            .finish()
    }
}

/// Ordered collection of functions a worker exposes to the planner
#[derive(Debug, Clone, Default)]
pub struct ActionSpace {
    functions: Vec<Function>,
}

impl ActionSpace {
    /// Create an empty action space
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    /// Register a function
    ///
    /// A function with the same name replaces the earlier registration.
    pub fn register(&mut self, function: Function) {
        match self
            .functions
            .iter()
            .position(|f| f.fn_name == function.fn_name)
        {
            Some(idx) => {
                tracing::warn!("Replacing function: {}", function.fn_name);
                self.functions[idx] = function;
            }
            None => {
                tracing::debug!("Registering function: {}", function.fn_name);
                self.functions.push(function);
            }
        }
    }

    /// Get a function by name
    pub fn get(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.fn_name == name)
    }

    /// Wire-visible definitions of all functions, in registration order
    pub fn definitions(&self) -> Vec<FunctionDef> {
        self.functions.iter().map(|f| f.definition()).collect()
    }

    /// Names of all registered functions
    pub fn names(&self) -> Vec<&str> {
        self.functions.iter().map(|f| f.fn_name.as_str()).collect()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Check if the action space is empty
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl From<Vec<Function>> for ActionSpace {
    fn from(functions: Vec<Function>) -> Self {
        let mut space = ActionSpace::new();
        for function in functions {
            space.register(function);
        }
        space
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_function() -> Function {
        Function::new(
            "echo",
            "Echo the message back",
            vec![Argument::new("message", "Message to echo").with_type("string")],
            |args| {
                let message = args
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                Ok((
                    FunctionResultStatus::Done,
                    format!("echoed: {}", message),
                    Map::new(),
                ))
            },
        )
    }

    #[test]
    fn test_execute_success() {
        let function = echo_function();
        let mut args = Map::new();
        args.insert("message".into(), json!("hello"));

        let result = function.execute("action-1", &args);
        assert_eq!(result.action_id, "action-1");
        assert_eq!(result.action_status, FunctionResultStatus::Done);
        assert_eq!(result.feedback_message, "echoed: hello");
    }

    #[test]
    fn test_execute_unwraps_value_objects() {
        let function = echo_function();
        let mut args = Map::new();
        args.insert("message".into(), json!({"value": "wrapped"}));

        let result = function.execute("action-2", &args);
        assert_eq!(result.feedback_message, "echoed: wrapped");
    }

    #[test]
    fn test_execute_error_becomes_failed_result() {
        let function = Function::new("boom", "Always fails", vec![], |_args| {
            anyhow::bail!("it broke")
        });

        let result = function.execute("action-3", &Map::new());
        assert_eq!(result.action_status, FunctionResultStatus::Failed);
        assert!(result.feedback_message.contains("it broke"));
    }

    #[test]
    fn test_result_wire_shape_excludes_info() {
        let mut info = Map::new();
        info.insert("secret".into(), json!("local"));
        let result = FunctionResult::done("action-4", "ok", info);

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["action_id"], "action-4");
        assert_eq!(wire["action_status"], "done");
        assert_eq!(wire["feedback_message"], "ok");
        assert!(wire.get("info").is_none());
    }

    #[test]
    fn test_definition_serialization() {
        let function = echo_function().with_hint("use sparingly");
        let def = serde_json::to_value(function.definition()).unwrap();

        assert_eq!(def["fn_name"], "echo");
        assert_eq!(def["fn_description"], "Echo the message back");
        assert_eq!(def["args"][0]["name"], "message");
        assert_eq!(def["args"][0]["type"], "string");
        assert_eq!(def["hint"], "use sparingly");
    }

    #[test]
    fn test_action_space_lookup_and_order() {
        let mut space = ActionSpace::new();
        space.register(echo_function());
        space.register(Function::new("noop", "Do nothing", vec![], |_| {
            Ok((FunctionResultStatus::Done, String::new(), Map::new()))
        }));

        assert_eq!(space.len(), 2);
        assert_eq!(space.names(), vec!["echo", "noop"]);
        assert!(space.get("echo").is_some());
        assert!(space.get("missing").is_none());
    }

    #[test]
    fn test_action_space_replaces_duplicate_names() {
        let mut space = ActionSpace::new();
        space.register(echo_function());
        space.register(Function::new("echo", "Replacement", vec![], |_| {
            Ok((FunctionResultStatus::Done, String::new(), Map::new()))
        }));

        assert_eq!(space.len(), 1);
        assert_eq!(space.get("echo").unwrap().fn_description, "Replacement");
    }
}
