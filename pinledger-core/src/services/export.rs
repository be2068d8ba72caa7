//! Export service - CSV account statements

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;

use crate::domain::result::{Error, Result};
use crate::ports::Store;

/// Rows exported when the caller does not say otherwise
pub const DEFAULT_EXPORT_LIMIT: usize = 50;

const HEADER: [&str; 5] = ["created_at", "type", "amount", "balance_after", "note"];

pub struct ExportService {
    store: Arc<dyn Store>,
}

impl ExportService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Write the latest `limit` transactions, newest first, to a CSV file in `dir`
    ///
    /// Returns the file path, or `None` when the account has no
    /// transactions (no file is written then).
    pub fn export_csv(&self, account_number: &str, limit: usize, dir: &Path) -> Result<Option<PathBuf>> {
        let account_number = account_number.trim();
        let account = self
            .store
            .find_account(account_number)?
            .ok_or_else(|| Error::not_found(format!("account {}", account_number)))?;

        let transactions = self.store.list_transactions(account.id, limit)?;
        if transactions.is_empty() {
            return Ok(None);
        }

        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "{}_statement_{}.csv",
            account_number,
            Utc::now().format("%Y-%m-%d_%H-%M-%S")
        ));

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(HEADER)?;
        for tx in &transactions {
            writer.write_record([
                tx.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                tx.kind.to_string(),
                format!("{:.2}", tx.amount),
                format!("{:.2}", tx.balance_after),
                tx.note.clone().unwrap_or_default(),
            ])?;
        }
        writer.flush()?;

        Ok(Some(path))
    }
}
