//! Account credentials

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Keys for one CloudBank account
///
/// The public key doubles as the host name of the account's bank server.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankKeys {
    #[serde(rename = "publickey")]
    pub public_key: String,
    #[serde(rename = "privatekey")]
    pub private_key: String,
    #[serde(default)]
    pub email: String,
}

impl BankKeys {
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
            email: email.into(),
        }
    }

    /// Load keys from a JSON key file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read key file {}: {}", path.display(), e))
        })?;
        let keys: BankKeys = serde_json::from_str(&content)?;
        keys.validate()?;
        Ok(keys)
    }

    /// Save keys to a JSON key file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.public_key.trim().is_empty() {
            return Err(Error::Config("Public key cannot be empty".to_string()));
        }
        if self.private_key.trim().is_empty() {
            return Err(Error::Config("Private key cannot be empty".to_string()));
        }
        Ok(())
    }
}

// Keep the private key out of logs and panic messages
impl fmt::Debug for BankKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankKeys")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}
