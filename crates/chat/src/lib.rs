//! Conversation orchestration for Copiloto.
//!
//! Two components, composed linearly:
//!
//! - the **context builder** ([`context`]) merges the fixed persona block
//!   with per-request situational facts into one instruction string;
//! - the **orchestrator** ([`Copilot`]) owns the record-append workflow:
//!   resolve or create the thread, reconstruct history, invoke the model,
//!   persist both sides of the exchange.
//!
//! The model seam is `Arc<dyn ModelClient>`, injected at construction —
//! there is no credential inspection or implicit backend choice here.

pub mod context;
pub mod orchestrator;
pub mod persona;
pub mod prompts;

pub use context::{ClientSnapshot, SituationalContext, build_instructions};
pub use orchestrator::{Copilot, SendOutcome};
