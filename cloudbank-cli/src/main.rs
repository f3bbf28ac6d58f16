//! CloudBank CLI - your coin account in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod output;

use commands::{balance, check, deposit, exchange, receipt, setup, transfer, withdraw};

/// CloudBank - deposit, withdraw and transfer coins from the command line
#[derive(Parser)]
#[command(name = "cloudbank", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save the account keys used by every other command
    Setup {
        /// Public key (the bank server host)
        #[arg(long)]
        public_key: Option<String>,
        /// Private key
        #[arg(long)]
        private_key: Option<String>,
        /// Account email
        #[arg(long)]
        email: Option<String>,
    },

    /// Show the account balance by denomination
    Balance {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit a stack file
    Deposit {
        /// Path to the stack file
        file: PathBuf,
        /// Deposit into another account (their public key)
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a deposit receipt and count its authentic coins
    Receipt {
        /// Receipt number returned by a deposit
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw coins and save them as a stack file
    Withdraw {
        /// Number of coins to withdraw
        amount: u64,
        /// Directory to write the stack file to
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit a stack, then withdraw only the coins the bank found authentic
    Exchange {
        /// Path to the stack file
        file: PathBuf,
        /// Seconds to wait for the bank to grade the deposit
        #[arg(long, default_value_t = 5)]
        wait_secs: u64,
        /// Directory to write the withdrawn stack to
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Move coins into another account
    Transfer {
        /// Recipient's public key
        to: String,
        /// Number of coins to send
        amount: u64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Have the bank write a check
    WriteCheck {
        /// Check amount in coins
        amount: u64,
        /// Who the check is made out to
        #[arg(long)]
        pay_to: String,
        /// Who signs the check
        #[arg(long)]
        signed_by: String,
        /// Memo line
        #[arg(long, default_value = "")]
        memo: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cash a check and deposit the proceeds
    CashCheck {
        /// Check ID
        id: String,
        /// Deposit into another account instead of this one
        #[arg(long)]
        to: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Setup { public_key, private_key, email } => {
            setup::run(public_key, private_key, email)
        }
        Commands::Balance { json } => balance::run(json).await,
        Commands::Deposit { file, to, json } => deposit::run(&file, to.as_deref(), json).await,
        Commands::Receipt { id, json } => receipt::run(&id, json).await,
        Commands::Withdraw { amount, out, json } => withdraw::run(amount, out, json).await,
        Commands::Exchange { file, wait_secs, out, json } => {
            exchange::run(&file, wait_secs, out, json).await
        }
        Commands::Transfer { to, amount, force, json } => {
            transfer::run(&to, amount, force, json).await
        }
        Commands::WriteCheck { amount, pay_to, signed_by, memo, json } => {
            check::write(amount, &pay_to, &signed_by, &memo, json).await
        }
        Commands::CashCheck { id, to, json } => check::cash(&id, to.as_deref(), json).await,
    }
}
