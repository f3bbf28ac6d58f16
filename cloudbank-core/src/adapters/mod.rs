//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest HTTP client for the HttpGateway port
//! - Local filesystem for the StackStore port
//! - Scripted in-memory collaborators for unit tests

pub mod http;
pub mod local_fs;

#[cfg(test)]
pub mod mock;
