//! CloudBank Core - client SDK for a CloudBank coin custody service
//!
//! This crate implements the client logic following hexagonal architecture:
//!
//! - **domain**: Bank entities (balances, receipts, stacks) and the pure
//!   denomination and receipt logic
//! - **ports**: Trait definitions for external dependencies (HttpGateway, StackStore)
//! - **services**: `BankSession`, which orchestrates requests against one account
//! - **adapters**: Concrete implementations (reqwest, local filesystem)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use adapters::http::ReqwestGateway;
use adapters::local_fs::LocalStackStore;
use config::Config;

// Re-export commonly used types at crate root
pub use domain::{
    BalanceSnapshot, BankKeys, CoinStack, Denomination, Interpretation, PendingTransfer, Receipt,
};
pub use domain::result::Error;
pub use services::{BankSession, Reconciliation};

/// Main context for CloudBank operations
///
/// Loads configuration and keys from the CloudBank directory and wires a
/// session to the real HTTP client and filesystem.
pub struct CloudBankContext {
    pub config: Config,
    pub session: BankSession,
}

impl CloudBankContext {
    /// Create a new CloudBank context
    pub fn new(cloudbank_dir: &Path) -> Result<Self> {
        let config = Config::load(cloudbank_dir)?;

        let keys_path = Config::keys_path(cloudbank_dir);
        let keys = BankKeys::load(&keys_path).with_context(|| {
            format!(
                "Failed to load bank keys from {}. Run 'cloudbank setup' first.",
                keys_path.display()
            )
        })?;

        let gateway = Arc::new(ReqwestGateway::with_timeout(Duration::from_secs(
            config.timeout_secs,
        ))?);
        let store = Arc::new(LocalStackStore::new());

        let session = BankSession::with_config(keys, gateway, store, &config);

        Ok(Self { config, session })
    }
}
