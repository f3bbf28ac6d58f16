//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The session
//! depends only on these traits, not on concrete implementations.

mod gateway;
mod stack_store;

pub use gateway::{HttpGateway, RawResponse};
pub use stack_store::StackStore;
