//! Interactive menu - the default when `bank` runs without a subcommand

use anyhow::{bail, Result};
use colored::Colorize;
use dialoguer::{Input, Password, Select};

use pinledger_core::{Authenticated, EntryPoint, Error, LogEvent, LoggingService, PinLedgerContext, TransactionKind};

use super::account::{move_funds, print_balance, print_export, print_history};
use super::admin::{print_stats, print_unlock, unlock};
use super::register::{interactive as register_interactive, print_registration};
use super::{get_context, get_logger, log_event, log_outcome, report};
use crate::output;

const MAIN_MENU: [&str; 5] = [
    "Create Account",
    "Login",
    "Admin Unlock",
    "Admin Dashboard",
    "Exit",
];

const ACCOUNT_MENU: [&str; 6] = [
    "Deposit",
    "Withdraw",
    "Check Balance",
    "View History",
    "Export CSV",
    "Logout",
];

pub fn run() -> Result<()> {
    if atty::isnt(atty::Stream::Stdin) {
        bail!("The interactive menu needs a terminal. Run `bank --help` for one-shot commands.");
    }

    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Menu);
    log_event(&logger, LogEvent::new("menu_started"));

    println!("{}", "PinLedger".bold());

    loop {
        println!();
        let choice = Select::new()
            .with_prompt("Main menu")
            .items(&MAIN_MENU)
            .default(0)
            .interact()?;

        match choice {
            0 => {
                let result = register_interactive(&ctx)?;
                log_outcome(&logger, "register", &result);
                match result {
                    Ok(reg) => print_registration(&reg),
                    Err(e) => report(&e),
                }
            }
            1 => {
                if let Some(auth) = login(&ctx, &logger)? {
                    account_menu(&ctx, &logger, &auth)?;
                }
            }
            2 => admin_unlock(&ctx, &logger)?,
            3 => admin_dashboard(&ctx, &logger)?,
            _ => {
                println!("Goodbye.");
                return Ok(());
            }
        }
    }
}

/// Ask for an account number, then PINs until one works or the account locks
fn login(ctx: &PinLedgerContext, logger: &Option<LoggingService>) -> Result<Option<Authenticated>> {
    let account: String = Input::new().with_prompt("Account number").interact_text()?;

    loop {
        let pin = Password::new().with_prompt("PIN").interact()?;
        let result = ctx.auth_service.authenticate(&account, &pin);
        log_outcome(logger, "login", &result);

        match result {
            Ok(auth) => {
                output::success("Login successful.");
                return Ok(Some(auth));
            }
            Err(Error::WrongPin { attempts_left }) => {
                output::warning(&format!(
                    "Wrong PIN. {} attempt{} left.",
                    attempts_left,
                    if attempts_left == 1 { "" } else { "s" }
                ));
            }
            Err(e) => {
                report(&e);
                return Ok(None);
            }
        }
    }
}

fn account_menu(
    ctx: &PinLedgerContext,
    logger: &Option<LoggingService>,
    auth: &Authenticated,
) -> Result<()> {
    let account = auth.account_number.as_str();

    loop {
        println!();
        let choice = Select::new()
            .with_prompt(format!("Account {}", account))
            .items(&ACCOUNT_MENU)
            .default(0)
            .interact()?;

        match choice {
            0 | 1 => {
                let (kind, command) = if choice == 0 {
                    (TransactionKind::Deposit, "deposit")
                } else {
                    (TransactionKind::Withdraw, "withdraw")
                };
                let amount: String = Input::new().with_prompt("Amount").interact_text()?;
                let note: String = Input::new()
                    .with_prompt("Note (optional)")
                    .allow_empty(true)
                    .interact_text()?;

                let result = move_funds(ctx, kind, account, &amount, Some(note.as_str()));
                log_outcome(logger, command, &result);
                match result {
                    Ok(balance) => {
                        output::success("Done.");
                        print_balance(balance);
                    }
                    Err(e) => report(&e),
                }
            }
            2 => {
                let result = ctx.ledger_service.get_balance(account);
                log_outcome(logger, "balance", &result);
                match result {
                    Ok(balance) => print_balance(balance),
                    Err(e) => report(&e),
                }
            }
            3 => {
                let result = ctx
                    .ledger_service
                    .list_transactions(account, ctx.config.history_limit);
                log_outcome(logger, "history", &result);
                match result {
                    Ok(txs) => print_history(&txs),
                    Err(e) => report(&e),
                }
            }
            4 => {
                let result = ctx.export_service.export_csv(
                    account,
                    ctx.config.export_limit,
                    &ctx.config.export_dir(),
                );
                log_outcome(logger, "export", &result);
                match result {
                    Ok(path) => print_export(path.as_ref()),
                    Err(e) => report(&e),
                }
            }
            _ => {
                output::info("Logged out.");
                return Ok(());
            }
        }
    }
}

/// Prompt for the admin code; false (after reporting) when it is wrong
fn admin_gate(ctx: &PinLedgerContext, logger: &Option<LoggingService>, command: &str) -> Result<bool> {
    let code = Password::new().with_prompt("Admin code").interact()?;
    let result = ctx.admin_service.verify_admin_code(&code);
    if let Err(e) = &result {
        log_outcome(logger, command, &result);
        report(e);
        return Ok(false);
    }
    Ok(true)
}

fn admin_unlock(ctx: &PinLedgerContext, logger: &Option<LoggingService>) -> Result<()> {
    if !admin_gate(ctx, logger, "admin_unlock")? {
        return Ok(());
    }
    let account: String = Input::new()
        .with_prompt("Account number to unlock")
        .interact_text()?;

    let result = unlock(ctx, &account);
    log_outcome(logger, "admin_unlock", &result);
    match result {
        Ok(view) => print_unlock(&view),
        Err(e) => report(&e),
    }
    Ok(())
}

fn admin_dashboard(ctx: &PinLedgerContext, logger: &Option<LoggingService>) -> Result<()> {
    if !admin_gate(ctx, logger, "admin_stats")? {
        return Ok(());
    }
    let result = ctx.admin_service.stats();
    log_outcome(logger, "admin_stats", &result);
    match result {
        Ok(stats) => print_stats(&stats),
        Err(e) => report(&e),
    }
    Ok(())
}
