//! Receipt command - fetch a deposit receipt and count its authentic coins

use anyhow::Result;
use colored::Colorize;

use crate::output;

use super::get_context;

pub async fn run(id: &str, json: bool) -> Result<()> {
    let mut ctx = get_context()?;

    let pb = output::spinner("Fetching receipt...", json);
    let result = ctx.session.fetch_receipt_by_id(id).await;
    pb.finish_and_clear();
    let receipt = result?;
    let interpretation = ctx.session.interpret_receipt()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&interpretation)?);
        return Ok(());
    }

    println!("{}", format!("Receipt {}", receipt.receipt_id).bold());
    if let Some(time) = &receipt.time {
        let zone = receipt.timezone.as_deref().unwrap_or_default();
        println!("{}", format!("{} {}", time, zone).dimmed());
    }
    println!();

    if !receipt.details.is_empty() {
        let mut table = output::create_table();
        table.set_header(vec!["Serial", "Status", "POWN", "Note"]);
        for detail in &receipt.details {
            let status = format!("{:?}", detail.status).to_lowercase();
            table.add_row(vec![
                detail.serial_number.to_string(),
                status,
                detail.proof_of_ownership.clone().unwrap_or_default(),
                detail.note.clone().unwrap_or_default(),
            ]);
        }
        println!("{}", table);
        println!();
    }

    let mut totals = output::create_table();
    totals.add_row(vec!["Authentic", &receipt.total_authentic.to_string()]);
    totals.add_row(vec!["Fracked", &receipt.total_fracked.to_string()]);
    totals.add_row(vec!["Counterfeit", &receipt.total_counterfeit.to_string()]);
    totals.add_row(vec!["Lost", &receipt.total_lost.to_string()]);
    println!("{}", totals);
    println!();

    output::success(&interpretation.summary);

    Ok(())
}
