//! Configuration management
//!
//! Settings live in `settings.json` inside the CloudBank directory:
//! ```json
//! {
//!   "scheme": "https",
//!   "timeoutSecs": 120,
//!   "receiptRoute": "query",
//!   "statusTags": { "balance": "coins_shown", "deposit": "importing", "check": "url" },
//!   "outputDir": "/home/me/CloudCoin"
//! }
//! ```
//! Every key is optional. Keys this crate doesn't manage are preserved on save.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::adapters::http::DEFAULT_TIMEOUT_SECS;
use crate::domain::StatusTags;

/// Settings file name inside the CloudBank directory
pub const SETTINGS_FILE: &str = "settings.json";
/// Key file name inside the CloudBank directory
pub const KEYS_FILE: &str = "keys.json";

pub const SCHEME_ENV: &str = "CLOUDBANK_SCHEME";
pub const RECEIPT_ROUTE_ENV: &str = "CLOUDBANK_RECEIPT_ROUTE";

/// How the private key travels when fetching a receipt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptRoute {
    /// `GET /get_receipt.aspx?rn=<id>&pk=<key>`
    #[default]
    Query,
    /// `GET /<key>/Receipts/<id>.json`
    Path,
}

impl FromStr for ReceiptRoute {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "query" | "form" => Ok(ReceiptRoute::Query),
            "path" => Ok(ReceiptRoute::Path),
            other => Err(format!("Unknown receipt route: {} (expected query or path)", other)),
        }
    }
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    receipt_route: Option<ReceiptRoute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_tags: Option<StatusTags>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// CloudBank configuration (resolved view of settings + environment)
#[derive(Debug, Clone)]
pub struct Config {
    /// `https` in production; `http` for local test servers
    pub scheme: String,
    pub timeout_secs: u64,
    pub receipt_route: ReceiptRoute,
    pub status_tags: StatusTags,
    /// Where withdrawn stacks are written when no directory is given
    pub output_dir: Option<PathBuf>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheme: "https".to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            receipt_route: ReceiptRoute::default(),
            status_tags: StatusTags::default(),
            output_dir: None,
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the CloudBank directory
    ///
    /// `CLOUDBANK_SCHEME` and `CLOUDBANK_RECEIPT_ROUTE` override the file.
    pub fn load(cloudbank_dir: &Path) -> Result<Self> {
        let settings_path = cloudbank_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content)?
        } else {
            SettingsFile::default()
        };

        let defaults = Config::default();

        let scheme = std::env::var(SCHEME_ENV)
            .ok()
            .or_else(|| raw.scheme.clone())
            .unwrap_or(defaults.scheme);
        if scheme != "https" && scheme != "http" {
            anyhow::bail!("Unsupported scheme '{}': expected https or http", scheme);
        }

        let receipt_route = match std::env::var(RECEIPT_ROUTE_ENV).ok() {
            Some(value) => value.parse().map_err(anyhow::Error::msg)?,
            None => raw.receipt_route.unwrap_or_default(),
        };

        Ok(Self {
            scheme,
            timeout_secs: raw.timeout_secs.unwrap_or(defaults.timeout_secs),
            receipt_route,
            status_tags: raw.status_tags.clone().unwrap_or_default(),
            output_dir: raw.output_dir.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the CloudBank directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, cloudbank_dir: &Path) -> Result<()> {
        let settings_path = cloudbank_dir.join(SETTINGS_FILE);

        let mut settings = self._raw_settings.clone();
        settings.scheme = Some(self.scheme.clone());
        settings.timeout_secs = Some(self.timeout_secs);
        settings.receipt_route = Some(self.receipt_route);
        settings.status_tags = Some(self.status_tags.clone());
        settings.output_dir = self.output_dir.clone();

        std::fs::create_dir_all(cloudbank_dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Path of the key file in the CloudBank directory
    pub fn keys_path(cloudbank_dir: &Path) -> PathBuf {
        cloudbank_dir.join(KEYS_FILE)
    }
}
