//! Deposit receipt domain model

use serde::{Deserialize, Deserializer, Serialize};

/// Verification outcome for a single note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Authentic,
    Counterfeit,
    Fracked,
    Lost,
    /// Any status string this client does not know about
    #[serde(other)]
    Unknown,
}

/// Accept `1000000` or `"1000000"`; stack files quote their numbers
fn number_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// One note's line on a receipt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDetail {
    /// Network number
    #[serde(rename = "nn", default, deserialize_with = "number_or_string")]
    pub note_id: i64,
    #[serde(rename = "sn", deserialize_with = "number_or_string")]
    pub serial_number: i64,
    pub status: NoteStatus,
    /// Proof-of-ownership string, one character per RAIDA node
    #[serde(rename = "pown", default)]
    pub proof_of_ownership: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl ReceiptDetail {
    pub fn new(serial_number: i64, status: NoteStatus) -> Self {
        Self {
            note_id: 1,
            serial_number,
            status,
            proof_of_ownership: None,
            note: None,
        }
    }

    pub fn is_authentic(&self) -> bool {
        self.status == NoteStatus::Authentic
    }
}

/// The bank's record of a deposited stack
///
/// Receipts are created by the bank after a deposit and are never mutated
/// locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    #[serde(rename = "bank_server", default)]
    pub server: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub total_authentic: u64,
    #[serde(default)]
    pub total_fracked: u64,
    #[serde(default)]
    pub total_counterfeit: u64,
    #[serde(default)]
    pub total_lost: u64,
    /// Older servers name this array `receipt`
    #[serde(rename = "receipt_detail", alias = "receipt", default)]
    pub details: Vec<ReceiptDetail>,
}

impl Receipt {
    /// Create an empty receipt with the given ID
    pub fn new(receipt_id: impl Into<String>) -> Self {
        Self {
            receipt_id: receipt_id.into(),
            server: None,
            time: None,
            timezone: None,
            total_authentic: 0,
            total_fracked: 0,
            total_counterfeit: 0,
            total_lost: 0,
            details: Vec::new(),
        }
    }

    /// Details whose status is exactly authentic
    pub fn authentic_details(&self) -> impl Iterator<Item = &ReceiptDetail> {
        self.details.iter().filter(|d| d.is_authentic())
    }
}
