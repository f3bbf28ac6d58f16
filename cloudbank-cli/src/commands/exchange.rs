//! Exchange command - deposit a stack, then withdraw what the bank authenticated

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::{get_context, resolve_output_dir, save_withdrawn};

pub async fn run(file: &Path, wait_secs: u64, out: Option<PathBuf>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let dir = resolve_output_dir(&ctx, out)?;
    ctx.session.load_stack(file)?;

    let pb = output::spinner("Depositing stack...", json);
    let deposit = ctx.session.deposit_stack(None).await;
    if let Err(e) = deposit {
        pb.finish_and_clear();
        return Err(e.into());
    }

    // The bank grades a deposit asynchronously; the receipt is only complete
    // once it is done.
    pb.set_message(format!("Waiting {}s for the bank to grade the coins...", wait_secs));
    tokio::time::sleep(Duration::from_secs(wait_secs)).await;

    pb.set_message("Reconciling receipt and withdrawing...");
    let result = ctx.session.reconcile_and_withdraw().await;
    pb.finish_and_clear();
    let reconciliation = result?;

    let path = save_withdrawn(&ctx, &dir, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "reconciliation": reconciliation,
            "path": path,
        }))?);
        return Ok(());
    }

    if let Ok(interpretation) = ctx.session.interpret_receipt() {
        output::info(&interpretation.summary);
    }
    println!(
        "Withdrew {} coins ({} authentic from receipt {})",
        reconciliation.amount_withdrawn.to_string().bold(),
        reconciliation.authentic_coins,
        reconciliation.receipt_id
    );

    Ok(())
}
