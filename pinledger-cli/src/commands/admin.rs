//! Admin commands - unlock accounts and view bank stats

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;

use pinledger_core::{BankStats, EntryPoint, PinLedgerContext};

use super::{emit, get_context, get_logger, log_outcome, resolve_admin_code};
use crate::output;

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Clear the lockout on an account
    Unlock {
        /// Account number to unlock
        account: String,
        /// Admin code (prompted when omitted)
        #[arg(long)]
        code: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show bank-wide totals
    Stats {
        /// Admin code (prompted when omitted)
        #[arg(long)]
        code: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct UnlockView {
    pub account_number: String,
    /// False when the account was not locked to begin with
    pub was_locked: bool,
}

pub fn run(command: AdminCommands) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    match command {
        AdminCommands::Unlock { account, code, json } => {
            let code = resolve_admin_code(code)?;
            let result = ctx
                .admin_service
                .verify_admin_code(&code)
                .and_then(|_| unlock(&ctx, &account));
            log_outcome(&logger, "admin_unlock", &result);
            emit(json, result, print_unlock)
        }
        AdminCommands::Stats { code, json } => {
            let code = resolve_admin_code(code)?;
            let result = ctx
                .admin_service
                .verify_admin_code(&code)
                .and_then(|_| ctx.admin_service.stats());
            log_outcome(&logger, "admin_stats", &result);
            emit(json, result, print_stats)
        }
    }
}

/// Unlock an account, noting whether it was locked
pub fn unlock(ctx: &PinLedgerContext, account: &str) -> pinledger_core::Result<UnlockView> {
    let was_locked = ctx.auth_service.is_locked(account)?;
    ctx.auth_service.unlock(account)?;
    Ok(UnlockView {
        account_number: account.trim().to_string(),
        was_locked,
    })
}

pub fn print_unlock(view: &UnlockView) {
    if view.was_locked {
        output::success(&format!("Account {} unlocked.", view.account_number));
    } else {
        output::info(&format!(
            "Account {} was not locked; failed attempts reset.",
            view.account_number
        ));
    }
}

pub fn print_stats(stats: &BankStats) {
    println!("{}", "Bank Statistics".bold());
    println!("{}", output::stats_table(stats));
}
