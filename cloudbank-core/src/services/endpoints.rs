//! CloudBank endpoint URLs
//!
//! Each account is served from `<scheme>://<public key>/`, so every URL is
//! built from the host the request is aimed at.

use url::Url;

use crate::config::ReceiptRoute;
use crate::domain::result::{Error, Result};

pub const SHOW_COINS: &str = "show_coins.aspx";
pub const DEPOSIT_ONE_STACK: &str = "deposit_one_stack.aspx";
pub const WITHDRAW_ACCOUNT: &str = "withdraw_account.aspx";
pub const GET_RECEIPT: &str = "get_receipt.aspx";
pub const WRITE_CHECK: &str = "write_check.aspx";
pub const CHECKS: &str = "checks.aspx";

/// URL builder for one deployment
#[derive(Debug, Clone)]
pub struct Endpoints {
    scheme: String,
    receipt_route: ReceiptRoute,
}

impl Endpoints {
    pub fn new(scheme: impl Into<String>, receipt_route: ReceiptRoute) -> Self {
        Self {
            scheme: scheme.into(),
            receipt_route,
        }
    }

    fn base(&self, host: &str) -> Result<Url> {
        let host = host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::precondition("Bank host (public key) is empty"));
        }
        Url::parse(&format!("{}://{}/", self.scheme, host))
            .map_err(|e| Error::Config(format!("Invalid bank host '{}': {}", host, e)))
    }

    fn endpoint(&self, host: &str, path: &str) -> Result<Url> {
        self.base(host)?
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    pub fn show_coins(&self, host: &str) -> Result<String> {
        Ok(self.endpoint(host, SHOW_COINS)?.into())
    }

    pub fn deposit_one_stack(&self, host: &str) -> Result<String> {
        Ok(self.endpoint(host, DEPOSIT_ONE_STACK)?.into())
    }

    pub fn withdraw_account(&self, host: &str) -> Result<String> {
        Ok(self.endpoint(host, WITHDRAW_ACCOUNT)?.into())
    }

    pub fn write_check(&self, host: &str) -> Result<String> {
        Ok(self.endpoint(host, WRITE_CHECK)?.into())
    }

    pub fn cash_check(&self, host: &str, check_id: &str) -> Result<String> {
        let mut url = self.endpoint(host, CHECKS)?;
        url.query_pairs_mut().append_pair("id", check_id);
        Ok(url.into())
    }

    /// Receipt URL; the private key rides in the query or the path depending
    /// on the configured route
    pub fn receipt(&self, host: &str, private_key: &str, receipt_id: &str) -> Result<String> {
        match self.receipt_route {
            ReceiptRoute::Query => {
                let mut url = self.endpoint(host, GET_RECEIPT)?;
                url.query_pairs_mut()
                    .append_pair("rn", receipt_id)
                    .append_pair("pk", private_key);
                Ok(url.into())
            }
            ReceiptRoute::Path => {
                let mut url = self.base(host)?;
                url.path_segments_mut()
                    .map_err(|_| Error::Config(format!("Bank host '{}' cannot carry a path", host)))?
                    .clear()
                    .push(private_key)
                    .push("Receipts")
                    .push(&format!("{}.json", receipt_id));
                Ok(url.into())
            }
        }
    }
}
