//! GAME API client
//!
//! Thin HTTP layer over the GAME service: bearer-token auth, JSON POSTs,
//! status-code mapping onto the SDK error taxonomy, and automatic retry with
//! exponential backoff for transient failures (429, 5xx, network errors).
//! Successful responses arrive wrapped in a `{"data": ...}` envelope which
//! is unwrapped here so callers only see the payload.

use std::cmp;
use std::env;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde_json::{json, Map, Value};

use super::planner::Planner;
use crate::actions::ActionResponse;
use crate::config::SdkConfig;
use crate::core::{SdkError, SdkResult};
use crate::worker::WorkerDef;

/// HTTP client for the GAME API
///
/// ```ignore
/// let client = GameClient::new("your_api_key")?;
/// let client = GameClient::with_config("your_api_key", SdkConfig::default().with_max_retries(5))?;
/// ```
pub struct GameClient {
    client: reqwest::Client,
    api_key: String,
    config: SdkConfig,
}

impl GameClient {
    /// Create a client with the default configuration
    pub fn new(api_key: impl Into<String>) -> SdkResult<Self> {
        Self::with_config(api_key, SdkConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config(api_key: impl Into<String>, config: SdkConfig) -> SdkResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(SdkError::configuration("API key not set"));
        }

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Create a client from environment variables
    ///
    /// Reads the API key from `GAME_API_KEY` and configuration overrides
    /// from the `GAME_*` variables described on [`SdkConfig`].
    pub fn from_env() -> SdkResult<Self> {
        let api_key = env::var("GAME_API_KEY")
            .map_err(|_| SdkError::configuration("GAME_API_KEY environment variable not set"))?;
        Self::with_config(api_key, SdkConfig::from_env()?)
    }

    /// The configuration this client was built with
    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    /// POST to an endpoint, retrying transient failures
    ///
    /// Returns the unwrapped `data` payload of the response envelope.
    pub async fn post(&self, endpoint: &str, body: &Value) -> SdkResult<Value> {
        let mut attempt: u32 = 0;
        loop {
            match self.execute_post(endpoint, body).await {
                Ok(data) => return Ok(data),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = cmp::max(e.suggested_delay(attempt), self.config.retry_delay);
                    tracing::warn!(
                        "Request to {} failed ({}), retrying in {:?} (attempt {}/{})",
                        endpoint,
                        e,
                        delay,
                        attempt + 1,
                        self.config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!("Request to {} failed: {}", endpoint, e);
                    return Err(e);
                }
            }
        }
    }

    /// Execute a single POST without retry
    async fn execute_post(&self, endpoint: &str, body: &Value) -> SdkResult<Value> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let body_text = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body_text, status.as_u16());
            return Err(SdkError::from_status(status.as_u16(), message, retry_after));
        }

        let body_text = response.text().await?;
        if body_text.is_empty() {
            return Ok(Value::Object(Map::new()));
        }

        let value: Value = serde_json::from_str(&body_text)
            .map_err(|_| SdkError::InvalidResponse("Invalid JSON response".into()))?;

        Ok(value
            .get("data")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }
}

#[async_trait::async_trait]
impl Planner for GameClient {
    async fn create_agent(&self, name: &str, description: &str, goal: &str) -> SdkResult<String> {
        if name.trim().is_empty() {
            return Err(SdkError::validation("Name cannot be empty"));
        }

        let data = self
            .post(
                "/v2/agents",
                &json!({
                    "name": name,
                    "description": description,
                    "goal": goal,
                }),
            )
            .await?;

        let agent_id = extract_id(&data, "id")
            .ok_or_else(|| SdkError::InvalidResponse("Missing id in agent response".into()))?;
        tracing::info!("Created agent: {}", agent_id);
        Ok(agent_id)
    }

    async fn create_worker_map(&self, workers: &[WorkerDef]) -> SdkResult<String> {
        let data = self.post("/v2/workers", &json!({ "workers": workers })).await?;

        let map_id = extract_id(&data, "id")
            .ok_or_else(|| SdkError::InvalidResponse("Missing id in worker response".into()))?;
        tracing::info!("Created worker map: {}", map_id);
        Ok(map_id)
    }

    async fn next_agent_action(
        &self,
        agent_id: &str,
        payload: &Value,
    ) -> SdkResult<ActionResponse> {
        let data = self
            .post(&format!("/v2/agents/{}/actions", agent_id), payload)
            .await?;

        serde_json::from_value(data)
            .map_err(|e| SdkError::InvalidResponse(format!("Malformed action response: {}", e)))
    }

    async fn create_task(&self, agent_id: &str, task: &str) -> SdkResult<String> {
        let data = self
            .post(
                &format!("/v2/agents/{}/tasks", agent_id),
                &json!({ "task": task }),
            )
            .await?;

        let submission_id = extract_id(&data, "submission_id").ok_or_else(|| {
            SdkError::InvalidResponse("Missing submission_id in task response".into())
        })?;
        tracing::info!("Created task submission: {}", submission_id);
        Ok(submission_id)
    }

    async fn next_task_action(
        &self,
        agent_id: &str,
        submission_id: &str,
        payload: &Value,
    ) -> SdkResult<ActionResponse> {
        let data = self
            .post(
                &format!("/v2/agents/{}/tasks/{}/next", agent_id, submission_id),
                payload,
            )
            .await?;

        serde_json::from_value(data)
            .map_err(|e| SdkError::InvalidResponse(format!("Malformed action response: {}", e)))
    }
}

/// Pull a string id field out of a response payload
fn extract_id(data: &Value, field: &str) -> Option<String> {
    match data.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        // Some endpoints return numeric ids
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a Retry-After header given in seconds
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Best-effort extraction of a human-readable error message from a response
///
/// Error bodies usually look like `{"error": {"message": "..."}}`, but the
/// fallbacks cover bare-string errors and non-JSON bodies.
fn extract_error_message(body: &str, status: u16) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            return message.to_string();
        }
    }

    match status {
        401 => "Invalid API key".to_string(),
        400 => "Invalid request".to_string(),
        429 => "Rate limit exceeded".to_string(),
        _ => "Server error".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            GameClient::new(""),
            Err(SdkError::Configuration(_))
        ));
        assert!(matches!(
            GameClient::new("   "),
            Err(SdkError::Configuration(_))
        ));
        assert!(GameClient::new("test_api_key").is_ok());
    }

    #[test]
    fn test_extract_error_message_nested() {
        let body = r#"{"error": {"message": "Invalid API key"}}"#;
        assert_eq!(extract_error_message(body, 401), "Invalid API key");
    }

    #[test]
    fn test_extract_error_message_bare_string() {
        let body = r#"{"error": "Rate limit exceeded"}"#;
        assert_eq!(extract_error_message(body, 429), "Rate limit exceeded");
    }

    #[test]
    fn test_extract_error_message_fallbacks() {
        assert_eq!(extract_error_message("not json", 401), "Invalid API key");
        assert_eq!(extract_error_message("not json", 400), "Invalid request");
        assert_eq!(extract_error_message("", 429), "Rate limit exceeded");
        assert_eq!(extract_error_message("<html>", 502), "Server error");
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "15".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(15)));

        let mut headers = HeaderMap::new();
        headers.insert("retry-after", "soon".parse().unwrap());
        assert_eq!(parse_retry_after(&headers), None);

        assert_eq!(parse_retry_after(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_id() {
        assert_eq!(
            extract_id(&json!({"id": "agent-1"}), "id"),
            Some("agent-1".to_string())
        );
        assert_eq!(extract_id(&json!({"id": 42}), "id"), Some("42".to_string()));
        assert_eq!(extract_id(&json!({"id": ""}), "id"), None);
        assert_eq!(extract_id(&json!({}), "id"), None);
    }
}
