//! PinLedger CLI - a PIN-protected ledger in your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

mod commands;
mod output;

use commands::{account, admin, logs, menu, register};
use pinledger_core::{EntryPoint, TransactionKind};

/// PinLedger - a PIN-protected banking ledger
///
/// Run without a subcommand for the interactive menu.
#[derive(Parser)]
#[command(name = "bank", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new user and open their account
    Register {
        /// Full name
        #[arg(long)]
        name: Option<String>,
        /// Email address (must be unique)
        #[arg(long)]
        email: Option<String>,
        /// PIN, 4-12 digits (prompted when omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Deposit money into an account
    Deposit {
        /// Account number
        account: String,
        /// Amount, e.g. 25 or 12.50
        amount: String,
        /// Note stored with the transaction
        #[arg(long)]
        note: Option<String>,
        /// PIN (falls back to BANK_PIN, then a prompt)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Withdraw money from an account
    Withdraw {
        /// Account number
        account: String,
        /// Amount, e.g. 25 or 12.50
        amount: String,
        /// Note stored with the transaction
        #[arg(long)]
        note: Option<String>,
        /// PIN (falls back to BANK_PIN, then a prompt)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the current balance
    Balance {
        /// Account number
        account: String,
        /// PIN (falls back to BANK_PIN, then a prompt)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recent transactions, newest first
    History {
        /// Account number
        account: String,
        /// Number of transactions (default from settings, 10)
        #[arg(short, long)]
        limit: Option<usize>,
        /// PIN (falls back to BANK_PIN, then a prompt)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export recent transactions to a CSV statement
    Export {
        /// Account number
        account: String,
        /// Number of transactions (default from settings, 50)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Output directory (default from settings, else current directory)
        #[arg(long)]
        dir: Option<PathBuf>,
        /// PIN (falls back to BANK_PIN, then a prompt)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: admin::AdminCommands,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let entry_point = if cli.command.is_some() {
        EntryPoint::Cli
    } else {
        EntryPoint::Menu
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            commands::log_failure(entry_point, &e);
            eprintln!("{}", format!("{:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        return menu::run();
    };

    match command {
        Commands::Register { name, email, pin, json } => register::run(name, email, pin, json),
        Commands::Deposit { account, amount, note, pin, json } => {
            account::run_movement(TransactionKind::Deposit, &account, &amount, note, pin, json)
        }
        Commands::Withdraw { account, amount, note, pin, json } => {
            account::run_movement(TransactionKind::Withdraw, &account, &amount, note, pin, json)
        }
        Commands::Balance { account, pin, json } => account::run_balance(&account, pin, json),
        Commands::History { account, limit, pin, json } => {
            account::run_history(&account, limit, pin, json)
        }
        Commands::Export { account, limit, dir, pin, json } => {
            account::run_export(&account, limit, dir, pin, json)
        }
        Commands::Admin { command } => admin::run(command),
        Commands::Logs { command } => logs::run(command),
    }
}
