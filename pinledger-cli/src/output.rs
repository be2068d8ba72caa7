//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

use pinledger_core::{BankStats, Transaction, TransactionKind};

/// Print a success message
pub fn success(msg: &str) {
    println!("{}", msg.green());
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format a money amount with two decimals and thousands separators
pub fn format_money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Ledger entries as a table, in the order given
pub fn transactions_table(transactions: &[Transaction]) -> Table {
    let mut table = create_table();
    table.set_header(vec!["Date", "Type", "Amount", "Balance", "Note"]);

    for tx in transactions {
        let amount = match tx.kind {
            TransactionKind::Deposit => format!("+{}", format_money(tx.amount)).green(),
            TransactionKind::Withdraw => format!("-{}", format_money(tx.amount)).red(),
        };
        table.add_row(vec![
            Cell::new(tx.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(tx.kind),
            Cell::new(amount).set_alignment(CellAlignment::Right),
            Cell::new(format_money(tx.balance_after)).set_alignment(CellAlignment::Right),
            Cell::new(tx.note.as_deref().unwrap_or("")),
        ]);
    }

    table
}

/// Bank-wide stats as a key/value table
pub fn stats_table(stats: &BankStats) -> Table {
    let mut table = create_table();
    table.add_row(vec!["Users".to_string(), stats.total_users.to_string()]);
    table.add_row(vec!["Accounts".to_string(), stats.total_accounts.to_string()]);
    table.add_row(vec!["Locked accounts".to_string(), stats.locked_accounts.to_string()]);
    table.add_row(vec!["Total balance".to_string(), format_money(stats.total_balance)]);
    table
}

/// Format bytes as human-readable size
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
