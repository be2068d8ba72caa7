//! Register command - create a user and their account

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Password};

use pinledger_core::{EntryPoint, PinLedgerContext, Registration};

use super::{emit, get_context, get_logger, log_outcome};
use crate::output;

pub fn run(name: Option<String>, email: Option<String>, pin: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let logger = get_logger(EntryPoint::Cli);

    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Full name").interact_text()?,
    };
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let pin = match pin {
        Some(pin) => pin,
        None => prompt_new_pin()?,
    };

    let result = ctx.registration_service.register(&name, &email, &pin);
    log_outcome(&logger, "register", &result);

    emit(json, result, print_registration)
}

/// Interactive registration, used by the menu
pub fn interactive(ctx: &PinLedgerContext) -> Result<pinledger_core::Result<Registration>> {
    let name: String = Input::new().with_prompt("Full name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let pin = prompt_new_pin()?;
    Ok(ctx.registration_service.register(&name, &email, &pin))
}

fn prompt_new_pin() -> Result<String> {
    Ok(Password::new()
        .with_prompt("Choose a PIN (4-12 digits)")
        .with_confirmation("Confirm PIN", "PINs do not match")
        .interact()?)
}

pub fn print_registration(reg: &Registration) {
    println!();
    output::success(&format!("Account created for {}", reg.user.name));
    println!("  Account number: {}", reg.account.account_number.bold());
    println!("{}", "  Keep this number; you need it to log in.".dimmed());
    println!();
}
