//! Service layer - business logic orchestration
//!
//! `BankSession` coordinates the domain decoders with the HTTP gateway and
//! stack store ports. `Endpoints` builds the URLs it talks to.

pub mod endpoints;
mod session;

pub use endpoints::Endpoints;
pub use session::{BankSession, Reconciliation};
