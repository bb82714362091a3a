//! Model client implementations for Copiloto.
//!
//! Two `ModelClient` implementations exist:
//!
//! - [`AnthropicClient`] — the live Messages API client
//! - [`CannedClient`] — a deterministic responder for installs without
//!   credentials
//!
//! Which one is wired in is decided once, here, from configuration. The
//! orchestrator never inspects credentials itself.

pub mod anthropic;
pub mod canned;

pub use anthropic::AnthropicClient;
pub use canned::CannedClient;

use std::sync::Arc;

use copiloto_core::ModelClient;
use tracing::info;

/// Build the model client from configuration.
///
/// With an API key configured, the live client is used; otherwise the
/// canned responder stands in so the rest of the system keeps working in
/// development.
pub fn build_from_config(config: &copiloto_config::AppConfig) -> Arc<dyn ModelClient> {
    match &config.model.api_key {
        Some(api_key) if !api_key.trim().is_empty() => {
            let mut client = AnthropicClient::new(api_key, &config.model.model_id)
                .with_max_tokens(config.model.max_tokens)
                .with_timeout_secs(config.model.request_timeout_secs);
            if let Some(base_url) = &config.model.base_url {
                client = client.with_base_url(base_url);
            }
            info!(model = %config.model.model_id, "Live model client configured");
            Arc::new(client)
        }
        _ => {
            info!("No model API key configured — using canned responses");
            Arc::new(CannedClient::new())
        }
    }
}
