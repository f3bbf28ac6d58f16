//! Local filesystem stack store

use std::path::Path;

use crate::domain::result::{Error, Result};
use crate::ports::StackStore;

/// Stack store backed by the local filesystem
#[derive(Debug, Clone, Default)]
pub struct LocalStackStore;

impl LocalStackStore {
    pub fn new() -> Self {
        Self
    }
}

impl StackStore for LocalStackStore {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        std::fs::read(path).map_err(|e| {
            Error::precondition(format!("Cannot read stack file {}: {}", path.display(), e))
        })
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
