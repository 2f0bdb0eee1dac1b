//! OpenAI-compatible chat-completions agent (OpenRouter by default).

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use spyfall_core::{GameError, GameResult};
use tracing::{debug, warn};

use super::{Agent, AgentFactory, DecisionRequest};
use crate::config::{AgentEndpointConfig, PlayerConfig};

/// One retry on transport failure, after this delay.
const RETRY_BACKOFF: Duration = Duration::from_millis(500);
const MAX_RETRIES: u32 = 1;

/// A single player's model behind an OpenAI-compatible endpoint.
pub struct OpenRouterAgent {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl OpenRouterAgent {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
    ) -> GameResult<Self> {
        let api_key = api_key.into();
        let model = model.into();
        if api_key.is_empty() {
            return Err(GameError::InvalidInput("API key is required".into()));
        }
        if model.is_empty() {
            return Err(GameError::InvalidInput("a model name is required".into()));
        }
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            model,
            temperature,
        })
    }

    fn payload(&self, request: &DecisionRequest) -> Value {
        json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                {"role": "system", "content": request.system_prompt},
                {"role": "user", "content": request.user_prompt},
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.kind.to_string(),
                    "schema": request.schema,
                },
            },
        })
    }

    async fn post(&self, payload: &Value) -> GameResult<Value> {
        let url = format!("{}/chat/completions", self.base_url);
        let mut attempt = 0;
        loop {
            let sent = self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(payload)
                .send()
                .await;

            match sent {
                Ok(resp) => {
                    let status = resp.status();
                    if !status.is_success() {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(GameError::unavailable(format!(
                            "{} returned {status}: {body}",
                            self.model
                        )));
                    }
                    return resp.json::<Value>().await.map_err(|e| {
                        GameError::invalid_response(format!("response body is not JSON: {e}"))
                    });
                }
                Err(e) if attempt < MAX_RETRIES => {
                    let delay = RETRY_BACKOFF * 2u32.pow(attempt);
                    warn!(model = %self.model, error = %e, ?delay, "Request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(GameError::unavailable(format!(
                        "request failed after {MAX_RETRIES} retries: {e}"
                    )));
                }
            }
        }
    }
}

/// Pull the JSON decision out of `choices[0].message.content`.
pub fn extract_structured(response: &Value) -> GameResult<Value> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| GameError::invalid_response("missing choices[0].message.content"))?;
    serde_json::from_str(strip_code_fence(content))
        .map_err(|e| GameError::invalid_response(format!("content is not valid JSON: {e}")))
}

/// Some models wrap JSON in a ```json fence even in structured mode.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

#[async_trait]
impl Agent for OpenRouterAgent {
    async fn decide(&self, request: &DecisionRequest) -> GameResult<Value> {
        debug!(
            model = %self.model,
            kind = %request.kind,
            prompt_chars = request.user_prompt.len(),
            "Sending structured request"
        );
        let response = self.post(&self.payload(request)).await?;
        extract_structured(&response)
    }
}

/// Builds `OpenRouterAgent`s sharing one HTTP client and credential.
pub struct OpenRouterFactory {
    http: reqwest::Client,
    endpoint: AgentEndpointConfig,
    api_key: String,
}

impl OpenRouterFactory {
    pub fn new(endpoint: AgentEndpointConfig, api_key: impl Into<String>) -> GameResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(endpoint.timeout_secs))
            .build()
            .map_err(|e| GameError::InvalidInput(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

impl AgentFactory for OpenRouterFactory {
    fn create(&self, player: &PlayerConfig) -> GameResult<Box<dyn Agent>> {
        let agent = OpenRouterAgent::new(
            self.http.clone(),
            &self.endpoint.base_url,
            &self.api_key,
            &player.model_name,
            player.temperature,
        )?;
        Ok(Box::new(agent))
    }
}
