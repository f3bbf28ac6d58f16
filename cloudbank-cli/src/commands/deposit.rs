//! Deposit command - send a stack file to the bank

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::get_context;

pub async fn run(file: &Path, to: Option<&str>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    ctx.session.load_stack(file)?;

    let pb = output::spinner("Depositing stack...", json);
    let result = ctx.session.deposit_stack(to).await;
    pb.finish_and_clear();
    let deposit = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&deposit)?);
        return Ok(());
    }

    let receipt_id = deposit.receipt_id.as_deref().unwrap_or_default();
    output::success(&deposit.message);
    println!("Receipt number: {}", receipt_id.bold());
    println!(
        "{}",
        format!("Run 'cloudbank receipt {}' once the bank has graded the coins.", receipt_id).dimmed()
    );

    Ok(())
}
