//! # SatScout Core
//!
//! Domain types, traits, and error definitions for the SatScout research
//! pipeline. This crate has **zero framework dependencies**: it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator is a trait here. Implementations live in their
//! respective crates:
//! - [`Provider`]: the LLM boundary (`prompt → completion`)
//! - [`Tool`]: the search boundary (`query → text`)
//! - [`ResultStore`]: persistence of extraction records
//!
//! The schema registry ([`schema`]) is the leaf of the system: it declares
//! which fields each research domain extracts.

pub mod error;
pub mod event;
pub mod message;
pub mod provider;
pub mod record;
pub mod schema;
pub mod store;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, StoreError, ToolError};
pub use event::{DomainEvent, EventBus};
pub use message::{Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use record::{ExtractionRecord, StoreRow, StoredEntry};
pub use schema::{Domain, FieldDescriptor, NOT_FOUND, Schema, define_schema};
pub use store::ResultStore;
pub use tool::{Tool, ToolRegistry, ToolResult};
