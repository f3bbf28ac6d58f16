//! HTTP gateway port
//!
//! Defines the interface the session uses to reach the bank. Implementations
//! own connection pooling, TLS and timeouts.

use async_trait::async_trait;

use crate::domain::result::Result;

/// Raw reply from the bank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 200 OK with the given body
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }
}

/// HTTP gateway trait
///
/// Any response that arrives, whatever its status code, is returned as
/// `Ok(RawResponse)`. Only failures to obtain a response are errors, and
/// those must be `Error::Transport`.
#[async_trait]
pub trait HttpGateway: Send + Sync {
    /// POST form-encoded fields
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<RawResponse>;

    /// GET a URL
    async fn get(&self, url: &str) -> Result<RawResponse>;
}
