//! One-shot account commands: deposit, withdraw, balance, history, export
//!
//! Every command checks the PIN first. A wrong PIN counts toward the
//! lockout exactly as in the interactive menu.

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;

use pinledger_core::{EntryPoint, LogEvent, PinLedgerContext, Transaction, TransactionKind};

use super::{
    emit, get_context, get_logger, log_event, log_outcome, parse_amount, report, resolve_pin,
};
use crate::output;

#[derive(Debug, Serialize)]
struct BalanceView {
    account_number: String,
    balance: Decimal,
}

#[derive(Debug, Serialize)]
struct ExportView {
    path: Option<PathBuf>,
}

/// Open the context and check the PIN
///
/// A failed check is logged and reported, then the process exits with 1.
fn open_authenticated(
    account: &str,
    pin: Option<String>,
    command: &str,
    json: bool,
) -> Result<PinLedgerContext> {
    let ctx = get_context()?;
    let pin = resolve_pin(pin)?;

    match ctx.auth_service.authenticate(account, &pin) {
        Ok(_) => Ok(ctx),
        Err(e) => {
            let logger = get_logger(EntryPoint::Cli);
            log_event(
                &logger,
                LogEvent::new(format!("{}_denied", command))
                    .with_command(command)
                    .with_core_error(&e),
            );
            if json {
                emit(true, Err::<(), _>(e), |_| {})?;
            } else {
                report(&e);
            }
            std::process::exit(1);
        }
    }
}

pub fn run_movement(
    kind: TransactionKind,
    account: &str,
    amount: &str,
    note: Option<String>,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let command = match kind {
        TransactionKind::Deposit => "deposit",
        TransactionKind::Withdraw => "withdraw",
    };
    let ctx = open_authenticated(account, pin, command, json)?;
    let logger = get_logger(EntryPoint::Cli);

    let result = move_funds(&ctx, kind, account, amount, note.as_deref()).map(|balance| BalanceView {
        account_number: account.trim().to_string(),
        balance,
    });
    log_outcome(&logger, command, &result);

    emit(json, result, |view| {
        output::success(&format!("{} complete.", capitalize(command)));
        println!("New balance: {}", output::format_money(view.balance).bold());
    })
}

/// Deposit or withdraw an amount typed as text
pub fn move_funds(
    ctx: &PinLedgerContext,
    kind: TransactionKind,
    account: &str,
    amount: &str,
    note: Option<&str>,
) -> pinledger_core::Result<Decimal> {
    let amount = parse_amount(amount)?;
    match kind {
        TransactionKind::Deposit => ctx.ledger_service.deposit(account, amount, note),
        TransactionKind::Withdraw => ctx.ledger_service.withdraw(account, amount, note),
    }
}

pub fn run_balance(account: &str, pin: Option<String>, json: bool) -> Result<()> {
    let ctx = open_authenticated(account, pin, "balance", json)?;
    let logger = get_logger(EntryPoint::Cli);

    let result = ctx.ledger_service.get_balance(account).map(|balance| BalanceView {
        account_number: account.trim().to_string(),
        balance,
    });
    log_outcome(&logger, "balance", &result);

    emit(json, result, |view| print_balance(view.balance))
}

pub fn run_history(account: &str, limit: Option<usize>, pin: Option<String>, json: bool) -> Result<()> {
    let ctx = open_authenticated(account, pin, "history", json)?;
    let logger = get_logger(EntryPoint::Cli);

    let limit = limit.unwrap_or(ctx.config.history_limit);
    let result = ctx.ledger_service.list_transactions(account, limit);
    log_outcome(&logger, "history", &result);

    emit(json, result, |txs| print_history(txs))
}

pub fn run_export(
    account: &str,
    limit: Option<usize>,
    dir: Option<PathBuf>,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let ctx = open_authenticated(account, pin, "export", json)?;
    let logger = get_logger(EntryPoint::Cli);

    let limit = limit.unwrap_or(ctx.config.export_limit);
    let dir = dir.unwrap_or_else(|| ctx.config.export_dir());
    let result = ctx
        .export_service
        .export_csv(account, limit, &dir)
        .map(|path| ExportView { path });
    log_outcome(&logger, "export", &result);

    emit(json, result, |view| print_export(view.path.as_ref()))
}

pub fn print_balance(balance: Decimal) {
    println!("Current balance: {}", output::format_money(balance).bold());
}

pub fn print_history(transactions: &[Transaction]) {
    if transactions.is_empty() {
        println!("{}", "No transactions yet.".dimmed());
        return;
    }
    println!("{}", output::transactions_table(transactions));
}

pub fn print_export(path: Option<&PathBuf>) {
    match path {
        Some(path) => output::success(&format!("Statement saved to {}", path.display())),
        None => output::warning("No transactions to export."),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
