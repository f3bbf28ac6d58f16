//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! and pure functions - no I/O besides key-file loading.

pub mod balance;
pub mod denomination;
pub mod interpretation;
mod keys;
pub mod receipt;
pub mod response;
pub mod result;
pub mod stack;
mod transfer;

pub use balance::BalanceSnapshot;
pub use denomination::{classify, Denomination};
pub use interpretation::{interpret, Interpretation};
pub use keys::BankKeys;
pub use receipt::{NoteStatus, Receipt, ReceiptDetail};
pub use response::{BankResponse, CheckIssued, DepositResponse, FailResponse, StatusTags};
pub use stack::CoinStack;
pub use transfer::PendingTransfer;
