//! Core abstractions for the tile host
//!
//! This crate provides the fundamental types and traits that all other
//! components depend on: the definition data model, the event registry,
//! and the persistence store contract.

mod definition;
mod error;
mod events;
mod store;

pub use definition::{Definition, DefinitionStyle, PLACEHOLDER_ID};
pub use error::{DefinitionError, StoreError};
pub use events::{DefinitionListener, EventHandler, EventRegistry, DEFAULT_GLOBAL_EVENTS};
pub use store::{DefinitionStore, DefinitionStores, MemoryDefinitionStore};

/// Result type for definition setup operations
pub type Result<T> = std::result::Result<T, DefinitionError>;
