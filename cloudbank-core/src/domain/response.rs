//! Bank reply shapes
//!
//! Every endpoint answers with either its success payload or a
//! `{status, message}` failure. The status field decides which one it is.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::balance::BalanceSnapshot;
use super::receipt::Receipt;
use super::result::{Error, Result};
use super::stack::CoinStack;

/// Longest slice of an unparseable body quoted back in an error
const BODY_EXCERPT_LEN: usize = 200;

/// Failure reply from the bank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Reply to a stack deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositResponse {
    #[serde(rename = "bank_server", default)]
    pub server: Option<String>,
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "receipt", default)]
    pub receipt_id: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// Reply to a write-check request; the message says where to redeem it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIssued {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// A decoded bank reply
#[derive(Debug, Clone, PartialEq)]
pub enum BankResponse<T> {
    Accepted(T),
    Rejected(FailResponse),
}

impl<T> BankResponse<T> {
    /// Turn a rejection into `Error::Rejected`
    pub fn into_result(self) -> Result<T> {
        match self {
            BankResponse::Accepted(payload) => Ok(payload),
            BankResponse::Rejected(fail) => Err(Error::rejected(fail.status, fail.message)),
        }
    }
}

/// Success tag for each status-tagged endpoint family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTags {
    #[serde(default = "default_balance_tag")]
    pub balance: String,
    #[serde(default = "default_deposit_tag")]
    pub deposit: String,
    #[serde(default = "default_check_tag")]
    pub check: String,
}

fn default_balance_tag() -> String {
    "coins_shown".to_string()
}

fn default_deposit_tag() -> String {
    "importing".to_string()
}

fn default_check_tag() -> String {
    "url".to_string()
}

impl Default for StatusTags {
    fn default() -> Self {
        Self {
            balance: default_balance_tag(),
            deposit: default_deposit_tag(),
            check: default_check_tag(),
        }
    }
}

fn is_success(http_status: u16) -> bool {
    (200..300).contains(&http_status)
}

fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(BODY_EXCERPT_LEN) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

/// Parse a body as JSON. Non-JSON bodies on error statuses are rejections,
/// on success statuses they are decode errors.
fn parse_body(http_status: u16, body: &str) -> Result<JsonValue> {
    match serde_json::from_str::<JsonValue>(body) {
        Ok(value) => Ok(value),
        Err(_) if !is_success(http_status) => Err(Error::rejected(
            format!("http {}", http_status),
            excerpt(body),
        )),
        Err(e) => Err(Error::decode(format!("{} (body: {})", e, excerpt(body)))),
    }
}

fn fail_from(value: &JsonValue, http_status: u16) -> FailResponse {
    let status = value
        .get("status")
        .and_then(JsonValue::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            if is_success(http_status) {
                "missing status".to_string()
            } else {
                format!("http {}", http_status)
            }
        });
    let message = value
        .get("message")
        .and_then(JsonValue::as_str)
        .unwrap_or_default()
        .to_string();
    FailResponse { status, message }
}

fn from_value<T: DeserializeOwned>(value: JsonValue) -> Result<T> {
    serde_json::from_value(value).map_err(|e| Error::decode(e.to_string()))
}

/// Decode a reply whose success is signalled by `status == success_tag`
fn decode_tagged<T: DeserializeOwned>(
    http_status: u16,
    body: &str,
    success_tag: &str,
) -> Result<BankResponse<T>> {
    let value = parse_body(http_status, body)?;
    let status = value.get("status").and_then(JsonValue::as_str);

    if is_success(http_status) && status == Some(success_tag) {
        Ok(BankResponse::Accepted(from_value(value)?))
    } else {
        Ok(BankResponse::Rejected(fail_from(&value, http_status)))
    }
}

pub fn decode_balance(
    http_status: u16,
    body: &str,
    tags: &StatusTags,
) -> Result<BankResponse<BalanceSnapshot>> {
    decode_tagged(http_status, body, &tags.balance)
}

/// An accepted deposit must carry a receipt id
pub fn decode_deposit(
    http_status: u16,
    body: &str,
    tags: &StatusTags,
) -> Result<BankResponse<DepositResponse>> {
    let reply = decode_tagged::<DepositResponse>(http_status, body, &tags.deposit)?;
    if let BankResponse::Accepted(deposit) = &reply {
        if deposit.receipt_id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::decode("deposit accepted without a receipt id"));
        }
    }
    Ok(reply)
}

pub fn decode_check_issued(
    http_status: u16,
    body: &str,
    tags: &StatusTags,
) -> Result<BankResponse<CheckIssued>> {
    decode_tagged(http_status, body, &tags.check)
}

/// Withdrawals and cashed checks answer with the stack itself. A `message`
/// field marks a failure reply instead.
pub fn decode_stack(http_status: u16, body: &str) -> Result<BankResponse<CoinStack>> {
    let value = parse_body(http_status, body)?;

    if !is_success(http_status) || value.get("message").is_some() || !value.is_object() {
        return Ok(BankResponse::Rejected(fail_from(&value, http_status)));
    }

    Ok(BankResponse::Accepted(CoinStack::new(body)))
}

pub fn decode_receipt(http_status: u16, body: &str) -> Result<BankResponse<Receipt>> {
    let value = parse_body(http_status, body)?;

    if is_success(http_status) && value.get("receipt_id").is_some() {
        Ok(BankResponse::Accepted(from_value(value)?))
    } else {
        Ok(BankResponse::Rejected(fail_from(&value, http_status)))
    }
}
