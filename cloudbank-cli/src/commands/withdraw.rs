//! Withdraw command - take coins out and save them as a stack file

use std::path::PathBuf;

use anyhow::Result;

use crate::output;

use super::{get_context, resolve_output_dir, save_withdrawn};

pub async fn run(amount: u64, out: Option<PathBuf>, json: bool) -> Result<()> {
    let mut ctx = get_context()?;
    let dir = resolve_output_dir(&ctx, out)?;

    let pb = output::spinner(&format!("Withdrawing {} coins...", amount), json);
    let result = ctx.session.withdraw(amount).await;
    pb.finish_and_clear();
    result?;

    let path = save_withdrawn(&ctx, &dir, json)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "amount": amount,
            "path": path,
        }))?);
    }

    Ok(())
}
