//! CLI command implementations

pub mod balance;
pub mod check;
pub mod deposit;
pub mod exchange;
pub mod receipt;
pub mod setup;
pub mod transfer;
pub mod withdraw;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cloudbank_core::CloudBankContext;

use crate::output;

/// Get the CloudBank directory from environment or default
pub fn get_cloudbank_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("CLOUDBANK_DIR") {
        Ok(PathBuf::from(dir))
    } else {
        Ok(dirs::home_dir()
            .context("Could not find home directory")?
            .join(".cloudbank"))
    }
}

/// Load config and keys and open a session
pub fn get_context() -> Result<CloudBankContext> {
    let cloudbank_dir = get_cloudbank_dir()?;
    CloudBankContext::new(&cloudbank_dir).context("Failed to initialize CloudBank context")
}

/// Where withdrawn stacks go: `--out`, then `outputDir` from settings, then
/// the current directory
pub fn resolve_output_dir(ctx: &CloudBankContext, out: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match out.or_else(|| ctx.config.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    Ok(dir)
}

/// Save the session's withdrawn stack and report where it went
pub fn save_withdrawn(ctx: &CloudBankContext, dir: &Path, json: bool) -> Result<PathBuf> {
    let path = ctx.session.save_withdrawn_stack(dir)?;
    if !json {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        output::success(&format!(
            "Saved {} to {}",
            output::format_size(size),
            path.display()
        ));
    }
    Ok(path)
}
