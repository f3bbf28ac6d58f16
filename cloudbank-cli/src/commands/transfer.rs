//! Transfer command - move coins into another account

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;

use crate::output;

use super::get_context;

pub async fn run(to: &str, amount: u64, force: bool, json: bool) -> Result<()> {
    let mut ctx = get_context()?;

    // Confirm unless --force
    if !force {
        println!(
            "\n{}",
            format!(
                "This will withdraw {} coins from {} and deposit them to {}.",
                amount,
                ctx.session.keys().public_key,
                to
            )
            .yellow()
        );

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let pb = output::spinner(&format!("Sending {} coins to {}...", amount, to), json);
    let result = ctx.session.transfer(to, amount).await;
    pb.finish_and_clear();

    let transfer = match result {
        Ok(transfer) => transfer,
        Err(e) => {
            if ctx.session.has_pending_stack() {
                // Withdrawal went through but the deposit didn't; keep the coins
                let dir = super::resolve_output_dir(&ctx, None)?;
                let path = ctx.session.save_withdrawn_stack(&dir)?;
                output::warning(&format!(
                    "Deposit to {} failed. Withdrawn coins saved to {}",
                    to,
                    path.display()
                ));
            }
            return Err(e.into());
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&transfer)?);
        return Ok(());
    }

    println!(
        "\n{} Sent {} coins to {}",
        "✓".green(),
        transfer.amount_requested,
        transfer.target
    );
    if let Some(receipt) = &transfer.deposit_receipt {
        println!("{}\n", format!("Recipient's receipt number: {}", receipt).dimmed());
    }

    Ok(())
}
