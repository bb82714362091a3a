//! # Copiloto Core
//!
//! Domain types, traits, and error definitions for the Copiloto promoter
//! backend. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The one real seam in the system — the hosted model endpoint — is defined
//! as a trait here (`ModelClient`). Implementations live in `copiloto-model`
//! and are selected once at composition time. Everything else (rows, ids,
//! the closed `Role` tag) is plain data.

pub mod client;
pub mod error;
pub mod model;
pub mod promoter;
pub mod thread;

// Re-export key types at crate root for ergonomics
pub use client::{Client, ClientStatus};
pub use error::{Error, ModelError, Result, StoreError};
pub use model::{ChatTurn, ModelClient, ModelOutcome, ModelReply, ModelRequest, TokenUsage};
pub use promoter::Promoter;
pub use thread::{Role, Thread, ThreadSummary, Turn, derive_title};
