//! Receipt interpretation
//!
//! Turns a retrieved receipt into a short human-readable summary plus the
//! authenticated totals.

use serde::Serialize;

use super::denomination::classify;
use super::receipt::Receipt;
use super::result::{Error, Result};

/// Read-only view over a receipt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interpretation {
    pub receipt: Receipt,
    pub summary: String,
    /// Authentic plus fracked notes
    pub total_authentic_notes: u64,
    /// Face value of the authentic notes only
    pub total_authentic_coins: u64,
}

/// Sum the face value of every authentic note on a receipt.
pub fn authentic_coin_value(receipt: &Receipt) -> Result<u64> {
    receipt
        .authentic_details()
        .try_fold(0u64, |total, detail| {
            let value = classify(detail.serial_number)?.value();
            total
                .checked_add(value)
                .ok_or_else(|| Error::decode("receipt coin value overflows"))
        })
}

/// Interpret a receipt.
///
/// Counterfeit and lost notes are excluded from the note count. Fracked notes
/// count as notes but add nothing to the coin value.
pub fn interpret(receipt: &Receipt) -> Result<Interpretation> {
    let total_notes = receipt
        .total_authentic
        .checked_add(receipt.total_fracked)
        .ok_or_else(|| Error::decode("receipt totals overflow"))?;
    let total_coins = authentic_coin_value(receipt)?;

    let summary = format!(
        "receipt number: {} total authentic notes: {} total authentic coins: {}",
        receipt.receipt_id, total_notes, total_coins
    );

    Ok(Interpretation {
        receipt: receipt.clone(),
        summary,
        total_authentic_notes: total_notes,
        total_authentic_coins: total_coins,
    })
}
