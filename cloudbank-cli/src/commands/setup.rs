//! Setup command - save the account keys

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Input;

use cloudbank_core::config::{Config, SETTINGS_FILE};
use cloudbank_core::BankKeys;

use super::get_cloudbank_dir;

fn prompt_if_missing(value: Option<String>, prompt: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => Ok(Input::new().with_prompt(prompt).interact_text()?),
    }
}

pub fn run(
    public_key: Option<String>,
    private_key: Option<String>,
    email: Option<String>,
) -> Result<()> {
    let cloudbank_dir = get_cloudbank_dir()?;
    std::fs::create_dir_all(&cloudbank_dir)
        .with_context(|| format!("Failed to create CloudBank directory: {:?}", cloudbank_dir))?;

    let public_key = prompt_if_missing(public_key, "Public key (bank server)")?;
    let private_key = prompt_if_missing(private_key, "Private key")?;
    let email = prompt_if_missing(email, "Email")?;

    let keys = BankKeys::new(public_key.trim(), private_key.trim(), email.trim());

    let keys_path = Config::keys_path(&cloudbank_dir);
    keys.save(&keys_path)
        .with_context(|| format!("Failed to write {}", keys_path.display()))?;

    // Write default settings once so they are easy to discover and edit
    if !cloudbank_dir.join(SETTINGS_FILE).exists() {
        Config::default().save(&cloudbank_dir)?;
    }

    println!("{} Keys saved to {}", "Success!".green(), keys_path.display());
    println!("Run 'cloudbank balance' to check the account.");

    Ok(())
}
