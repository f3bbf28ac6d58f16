//! Check commands - write a check, or cash one and deposit the proceeds

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::{get_context, resolve_output_dir};

pub async fn write(amount: u64, pay_to: &str, signed_by: &str, memo: &str, json: bool) -> Result<()> {
    let mut ctx = get_context()?;

    let pb = output::spinner("Writing check...", json);
    let result = ctx.session.write_check(amount, pay_to, signed_by, memo).await;
    pb.finish_and_clear();
    let issued = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&issued)?);
        return Ok(());
    }

    output::success(&format!("Check for {} coins written to {}", amount, pay_to));
    println!("{}", issued.message.bold());

    Ok(())
}

pub async fn cash(id: &str, to: Option<&str>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;

    let pb = output::spinner("Cashing check...", json);
    let cashed = ctx.session.cash_check(id).await;
    if let Err(e) = cashed {
        pb.finish_and_clear();
        return Err(e.into());
    }

    pb.set_message("Depositing proceeds...");
    let result = ctx.session.deposit_stack(to).await;
    pb.finish_and_clear();

    let deposit = match result {
        Ok(deposit) => deposit,
        Err(e) => {
            if ctx.session.has_pending_stack() {
                // The bank already paid out; keep the coins on disk
                let dir = resolve_output_dir(&ctx, None)?;
                let path = ctx.session.save_pending_stack(&dir)?;
                output::warning(&format!(
                    "Deposit of check {} failed. Cashed coins saved to {}",
                    id,
                    path.display()
                ));
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&deposit)?);
        return Ok(());
    }

    output::success(&format!("Check {} cashed and deposited", id));
    if let Some(receipt) = &deposit.receipt_id {
        println!("Receipt number: {}", receipt.bold());
    }

    Ok(())
}
