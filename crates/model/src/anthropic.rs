//! Live Messages API client.
//!
//! Talks to Anthropic's Messages API directly:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - instruction block as the top-level `system` field
//! - conversation history as a strict user/assistant message array

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use copiloto_core::error::ModelError;
use copiloto_core::model::{ModelClient, ModelReply, ModelRequest, TokenUsage};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Messages API client.
pub struct AnthropicClient {
    name: String,
    base_url: String,
    api_key: String,
    model_id: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a new client for the given key and model.
    pub fn new(api_key: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            name: "anthropic".into(),
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client: build_http_client(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create with a custom base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-response token cap.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Override the outbound request timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.client = build_http_client(secs);
        self
    }
}

fn build_http_client(timeout_secs: u64) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_default()
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, request: ModelRequest) -> Result<ModelReply, ModelError> {
        let url = format!("{}/v1/messages", self.base_url);

        let messages: Vec<serde_json::Value> = request
            .turns
            .iter()
            .map(|t| {
                serde_json::json!({
                    "role": t.role.as_str(),
                    "content": t.content,
                })
            })
            .collect();

        let body = serde_json::json!({
            "model": self.model_id,
            "max_tokens": self.max_tokens,
            "system": request.instructions,
            "messages": messages,
        });

        debug!(model = %self.model_id, turns = request.turns.len(), "Sending model request");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(e.to_string())
                } else {
                    ModelError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ModelError::RateLimited);
        }
        if status == 401 || status == 403 {
            return Err(ModelError::AuthenticationFailed(
                "Invalid model API key".into(),
            ));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Model API error");
            return Err(ModelError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let text = api_resp
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(ModelError::InvalidResponse(
                "Response contained no text blocks".into(),
            ));
        }

        Ok(ModelReply {
            text,
            usage: api_resp.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }
}

// --- API response types ---

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}
