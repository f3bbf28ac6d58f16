//! reqwest-backed HTTP gateway
//!
//! Sends CloudBank requests over HTTP(S). Every answer that comes back is
//! handed to the session untouched; only failures to get an answer are
//! mapped to transport errors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::ports::{HttpGateway, RawResponse};

/// Default client timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// HTTP gateway over a pooled reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestGateway {
    client: Client,
    timeout: Duration,
}

impl ReqwestGateway {
    /// Create a gateway with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cloudbank-rs/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, timeout })
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> DomainError {
        if error.is_timeout() {
            DomainError::transport(format!(
                "Connection timed out after {} seconds",
                self.timeout.as_secs_f32()
            ))
        } else if error.is_connect() {
            DomainError::transport(format!(
                "Unable to connect to the bank server. Check your connection or your public key ({})",
                error
            ))
        } else {
            DomainError::transport(format!("Bank request failed: {}", error))
        }
    }

    async fn read(&self, response: reqwest::Response) -> DomainResult<RawResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| self.map_request_error(e))?;
        debug!(status, bytes = body.len(), "bank response received");
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl HttpGateway for ReqwestGateway {
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> DomainResult<RawResponse> {
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read(response).await
    }

    async fn get(&self, url: &str) -> DomainResult<RawResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        self.read(response).await
    }
}
