//! In-flight transfer state

use serde::Serialize;

use super::stack::CoinStack;

/// Progress of a withdraw-then-deposit transfer
///
/// Fields fill in step by step; a completed transfer has all three.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingTransfer {
    pub target: String,
    pub amount_requested: u64,
    #[serde(skip)]
    pub withdrawn_stack: Option<CoinStack>,
    pub deposit_receipt: Option<String>,
}

impl PendingTransfer {
    pub fn new(target: impl Into<String>, amount_requested: u64) -> Self {
        Self {
            target: target.into(),
            amount_requested,
            withdrawn_stack: None,
            deposit_receipt: None,
        }
    }

    /// Both legs went through
    pub fn is_complete(&self) -> bool {
        self.withdrawn_stack.is_some() && self.deposit_receipt.is_some()
    }
}
