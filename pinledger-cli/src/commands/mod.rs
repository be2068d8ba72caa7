//! CLI command implementations

pub mod account;
pub mod admin;
pub mod logs;
pub mod menu;
pub mod register;

use std::io::BufRead;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use dialoguer::Password;
use rust_decimal::Decimal;
use serde::Serialize;

use pinledger_core::{EntryPoint, Error, LogEvent, LoggingService, OperationResult, PinLedgerContext};

use crate::output;

/// Environment variable pointing at the data directory
const DATA_DIR_ENV: &str = "PINLEDGER_DIR";

/// Environment variable holding the PIN for one-shot commands
const PIN_ENV: &str = "BANK_PIN";

/// Get the logging service
///
/// Returns None if logging fails to initialize (never blocks operations)
pub fn get_logger(entry_point: EntryPoint) -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, entry_point, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging never breaks the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log the outcome of a core operation under `command`
pub fn log_outcome<T>(logger: &Option<LoggingService>, command: &str, result: &pinledger_core::Result<T>) {
    let event = match result {
        Ok(_) => LogEvent::new(format!("{}_succeeded", command)),
        Err(e) => LogEvent::new(format!("{}_failed", command)).with_core_error(e),
    };
    log_event(logger, event.with_command(command));
}

/// Record a command that ended in an error outside the core
///
/// Core errors are already logged by `log_outcome`, by code only.
pub fn log_failure(entry_point: EntryPoint, error: &anyhow::Error) {
    if let Some(event) = failure_event(error) {
        log_event(&get_logger(entry_point), event);
    }
}

fn failure_event(error: &anyhow::Error) -> Option<LogEvent> {
    if error.downcast_ref::<Error>().is_some() {
        return None;
    }

    let event = LogEvent::new("command_failed").with_error(error.to_string());
    let causes: Vec<String> = error.chain().skip(1).map(|cause| cause.to_string()).collect();
    if causes.is_empty() {
        Some(event)
    } else {
        Some(event.with_error_details(causes.join(": ")))
    }
}

/// Data directory from `PINLEDGER_DIR`, or `~/.pinledger`
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".pinledger"))
        .ok_or_else(|| anyhow!("Could not find home directory; set {}", DATA_DIR_ENV))
}

/// Open the ledger in the data directory
pub fn get_context() -> Result<PinLedgerContext> {
    let data_dir = get_data_dir()?;
    PinLedgerContext::new(&data_dir)
        .with_context(|| format!("Failed to open ledger in {}", data_dir.display()))
}

/// PIN from `--pin`, then `BANK_PIN`, then stdin when piped, then a hidden prompt
pub fn resolve_pin(pin: Option<String>) -> Result<String> {
    if let Some(pin) = pin {
        return Ok(pin);
    }
    if let Ok(pin) = std::env::var(PIN_ENV) {
        return Ok(pin);
    }
    if atty::isnt(atty::Stream::Stdin) {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        return Ok(line.trim().to_string());
    }
    Ok(Password::new().with_prompt("PIN").interact()?)
}

/// Admin code from `--code`, then the hidden prompt
///
/// `BANK_ADMIN_CODE` changes the expected code, it never supplies one.
pub fn resolve_admin_code(code: Option<String>) -> Result<String> {
    match code {
        Some(code) => Ok(code),
        None => Ok(Password::new().with_prompt("Admin code").interact()?),
    }
}

/// Parse a money amount typed by the user
pub fn parse_amount(input: &str) -> pinledger_core::Result<Decimal> {
    let cleaned = input.trim().trim_start_matches('$').replace(',', "");
    Decimal::from_str(&cleaned).map_err(|_| Error::InvalidAmount)
}

/// Print a core result either as a JSON envelope or through `render`
///
/// In JSON mode a failure still prints the envelope, then exits with 1.
pub fn emit<T: Serialize>(
    json: bool,
    result: pinledger_core::Result<T>,
    render: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let failed = result.is_err();
        let envelope: OperationResult<T> = result.into();
        println!("{}", serde_json::to_string_pretty(&envelope)?);
        if failed {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(data) => {
            render(&data);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

/// Human-readable hint for an auth failure, printed under the error
pub fn auth_hint(error: &Error) -> Option<&'static str> {
    match error {
        Error::Locked | Error::LockedJustNow => Some("Ask an administrator to run `bank admin unlock`."),
        Error::NotFound(_) => Some("Check the account number and try again."),
        _ => None,
    }
}

/// Print a core error in red, with a hint when there is one
pub fn report(error: &Error) {
    output::error(&error.to_string());
    if let Some(hint) = auth_hint(error) {
        output::info(hint);
    }
}
