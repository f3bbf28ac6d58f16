//! Coin stacks and stack file naming

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

use super::result::{Error, Result};

/// Last millisecond handed out as a withdrawal tag
static LAST_TAG_MS: AtomicI64 = AtomicI64::new(0);

/// A serialized bundle of notes
///
/// The contents are exchanged verbatim with the bank; this crate never looks
/// inside.
#[derive(Clone, PartialEq, Eq)]
pub struct CoinStack(String);

impl CoinStack {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Build a stack from file contents
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let raw = String::from_utf8(bytes)
            .map_err(|_| Error::precondition("Stack file is not valid UTF-8"))?;
        if raw.trim().is_empty() {
            return Err(Error::precondition("Stack file is empty"));
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for CoinStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CoinStack({} bytes)", self.0.len())
    }
}

/// Next withdrawal tag millisecond, strictly greater than any handed out before
fn next_tag_ms(now_ms: i64) -> i64 {
    let mut last = LAST_TAG_MS.load(Ordering::Relaxed);
    loop {
        let next = now_ms.max(last + 1);
        match LAST_TAG_MS.compare_exchange_weak(last, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// Format a tag millisecond as `YYYYMMDDHHMMSSmmm` in UTC
///
/// UTC has no repeated hour, so distinct milliseconds give distinct tags.
fn format_tag(ms: i64) -> String {
    match DateTime::from_timestamp_millis(ms) {
        Some(ts) => ts.format("%Y%m%d%H%M%S%3f").to_string(),
        None => ms.to_string(),
    }
}

/// Timestamp token for a withdrawal with no receipt number
pub fn withdrawal_tag() -> String {
    format_tag(next_tag_ms(Utc::now().timestamp_millis()))
}

/// File name for a stack that was redeemed or withdrawn but never deposited
pub fn pending_stack_file_name() -> String {
    format!("Pending.CloudCoin.{}.stack", withdrawal_tag())
}

/// File name for a withdrawn stack.
///
/// `<amount>.CloudCoin.<receipt>.stack` when a receipt number is known,
/// `<amount>.CloudCoin.Withdrawal<timestamp>.stack` otherwise.
pub fn stack_file_name(amount: u64, receipt_number: Option<&str>) -> String {
    match receipt_number {
        Some(rn) => format!("{}.CloudCoin.{}.stack", amount, rn),
        None => format!("{}.CloudCoin.Withdrawal{}.stack", amount, withdrawal_tag()),
    }
}
