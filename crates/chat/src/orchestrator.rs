//! Conversation orchestrator.
//!
//! Owns the record-append workflow for one `send_message` call:
//! resolve thread → reconstruct history → build instructions → invoke
//! model → persist both turns → return.
//!
//! Invariants honored here:
//! - an empty message is rejected before any thread or turn side effect;
//! - the history handed to the model is the stored turns in creation
//!   order plus the new user message last, never re-ordered;
//! - a model failure becomes a degraded outcome with fallback text and the
//!   exchange is still persisted — turn count grows by exactly two per
//!   call, success or not;
//! - both appends happen only after the model call returns, so a crash
//!   mid-call leaves no partial turn.

use std::sync::Arc;

use copiloto_core::error::{Error, Result};
use copiloto_core::model::{ChatTurn, ModelClient, ModelOutcome, ModelRequest, TokenUsage};
use copiloto_core::{Role, Thread, ThreadSummary, Turn, derive_title};
use copiloto_store::Store;
use serde::Serialize;
use tracing::{debug, warn};

use crate::context::{SituationalContext, build_instructions};
use crate::persona::PERSONA;

/// User-presentable fallback when the model endpoint fails.
pub const FALLBACK_TEXT: &str =
    "Lo siento, hubo un error al procesar tu solicitud. Por favor intenta de nuevo.";

/// Result of one `send_message` call.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub thread_id: i64,
    pub response: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

/// The conversation orchestrator.
///
/// Holds the store and an injected model client; construction is the only
/// place the concrete model backend is decided.
pub struct Copilot {
    store: Store,
    model: Arc<dyn ModelClient>,
    persona: String,
}

impl Copilot {
    pub fn new(store: Store, model: Arc<dyn ModelClient>) -> Self {
        Self {
            store,
            model,
            persona: PERSONA.to_string(),
        }
    }

    /// Override the persona block (tests, tenant-specific deployments).
    pub fn with_persona(mut self, persona: impl Into<String>) -> Self {
        self.persona = persona.into();
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Send a message within a thread (or start a new one).
    ///
    /// When `thread_id` is `None` a thread is created lazily, titled with
    /// the first message truncated to 50 characters. An existing id is
    /// looked up scoped to `owner_id` and fails with `NotFound` when it is
    /// missing or foreign.
    pub async fn send_message(
        &self,
        owner_id: i64,
        thread_id: Option<i64>,
        message: &str,
        ctx: &SituationalContext,
    ) -> Result<SendOutcome> {
        if message.trim().is_empty() {
            return Err(Error::Validation("message must not be empty".into()));
        }

        let thread = self.resolve_thread(owner_id, thread_id, message).await?;

        let history = self.store.list_turns(thread.id).await?;
        let mut turns: Vec<ChatTurn> = history
            .iter()
            .map(|t| ChatTurn {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();
        turns.push(ChatTurn::user(message));

        let instructions = build_instructions(&self.persona, ctx);

        let outcome = self
            .invoke_model(ModelRequest {
                instructions,
                turns,
            })
            .await;

        // Persist both sides of the exchange only after the model call has
        // returned, whether it succeeded or not.
        self.store
            .append_turn(thread.id, Role::User, message)
            .await?;
        self.store
            .append_turn(thread.id, Role::Assistant, &outcome.text)
            .await?;

        debug!(
            thread_id = thread.id,
            success = outcome.success,
            "Exchange persisted"
        );

        Ok(SendOutcome {
            thread_id: thread.id,
            response: outcome.text,
            success: outcome.success,
            usage: outcome.usage,
        })
    }

    /// List thread summaries for an owner (no turn bodies).
    pub async fn list_threads(&self, owner_id: i64) -> Result<Vec<ThreadSummary>> {
        Ok(self.store.list_threads(owner_id).await?)
    }

    /// Load one thread with its full turn sequence.
    pub async fn get_thread(&self, owner_id: i64, thread_id: i64) -> Result<(Thread, Vec<Turn>)> {
        let thread = self
            .store
            .find_thread(owner_id, thread_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("thread {thread_id}")))?;
        let turns = self.store.list_turns(thread_id).await?;
        Ok((thread, turns))
    }

    /// Delete a thread and, via cascade, all its turns.
    pub async fn delete_thread(&self, owner_id: i64, thread_id: i64) -> Result<()> {
        if self.store.delete_thread(owner_id, thread_id).await? {
            Ok(())
        } else {
            Err(Error::NotFound(format!("thread {thread_id}")))
        }
    }

    /// One-shot invocation with the persona alone — no thread, no
    /// persistence. Used by the prompt tools.
    pub(crate) async fn one_shot(&self, prompt: String) -> ModelOutcome {
        self.invoke_model(ModelRequest {
            instructions: self.persona.clone(),
            turns: vec![ChatTurn::user(prompt)],
        })
        .await
    }

    async fn resolve_thread(
        &self,
        owner_id: i64,
        thread_id: Option<i64>,
        first_message: &str,
    ) -> Result<Thread> {
        match thread_id {
            Some(id) => self
                .store
                .find_thread(owner_id, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("thread {id}"))),
            None => {
                let title = derive_title(first_message);
                Ok(self.store.create_thread(owner_id, &title).await?)
            }
        }
    }

    /// Invoke the model, converting any failure into a degraded outcome.
    /// No retries; conversation continuity wins over error fidelity.
    async fn invoke_model(&self, request: ModelRequest) -> ModelOutcome {
        match self.model.invoke(request).await {
            Ok(reply) => ModelOutcome::ok(reply),
            Err(e) => {
                warn!(model = self.model.name(), error = %e, "Model call failed, degrading");
                ModelOutcome::degraded(FALLBACK_TEXT, &e)
            }
        }
    }
}
