//! Stack persistence port

use std::path::Path;

use crate::domain::result::Result;

/// Reads and writes coin-stack files
pub trait StackStore: Send + Sync {
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Write a stack, replacing any existing file at `path`
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<()>;
}
