//! Balance command - show notes per denomination

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::get_context;

pub async fn run(json: bool) -> Result<()> {
    let mut ctx = get_context()?;

    let pb = output::spinner("Asking the bank for the balance...", json);
    let result = ctx.session.inquire_balance().await;
    pb.finish_and_clear();
    let balance = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "balance": balance,
            "total": balance.total(),
        }))?);
        return Ok(());
    }

    println!("{}", format!("Balance for {}", ctx.session.keys().public_key).bold());
    println!();

    let mut table = output::create_table();
    table.set_header(vec!["Denomination", "Notes", "Coins"]);
    let rows = [
        (1u64, balance.ones),
        (5, balance.fives),
        (25, balance.twentyfives),
        (100, balance.hundreds),
        (250, balance.twohundredfifties),
    ];
    for (value, count) in rows {
        table.add_row(vec![
            value.to_string(),
            count.to_string(),
            count.saturating_mul(value).to_string(),
        ]);
    }
    println!("{}", table);
    println!();
    println!(
        "Total: {} coins in {} notes",
        balance.total().to_string().green().bold(),
        balance.note_count()
    );

    Ok(())
}
