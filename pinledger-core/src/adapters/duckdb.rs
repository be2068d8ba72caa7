//! DuckDB store implementation

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, OptionalExt};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, BankStats, NewTransaction, Transaction, TransactionKind, User, MAX_FAILED_ATTEMPTS,
};
use crate::ports::Store;
use crate::services::{MigrationResult, MigrationService};

/// Maximum number of retries when database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

const ACCOUNT_COLUMNS: &str = "account_id, account_number, user_id, pin_hash, balance::VARCHAR,
     failed_attempts, is_locked, created_at::VARCHAR, updated_at::VARCHAR";

const TRANSACTION_COLUMNS: &str = "transaction_id, account_id, type, amount::VARCHAR,
     balance_after::VARCHAR, note, created_at::VARCHAR";

impl From<duckdb::Error> for Error {
    fn from(e: duckdb::Error) -> Self {
        Error::Database(e.to_string())
    }
}

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("could not set lock on file")
        || lower.contains("file is already open")
}

/// DuckDB-backed `Store`
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: Option<PathBuf>,
}

impl DuckDbStore {
    /// Open (or create) a database file
    ///
    /// Retries with exponential backoff when another process holds the file
    /// lock, e.g. a second `bank` invocation still shutting down.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: Some(db_path.to_path_buf()),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[pinledger] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.map(Error::from).unwrap_or_else(|| {
            Error::database(format!("Failed to open database after {} retries", MAX_RETRIES))
        }))
    }

    /// Open a throwaway database that lives only as long as the store
    pub fn open_in_memory() -> Result<Self> {
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Self {
            conn: Mutex::new(Connection::open_in_memory_with_flags(config)?),
            db_path: None,
        })
    }

    /// Attempt to open a database connection (called by new() with retry logic)
    fn try_open_connection(db_path: &Path) -> duckdb::Result<Connection> {
        // Extensions are never needed; keep DuckDB from fetching any
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Connection::open_with_flags(db_path, config)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Run database migrations using the MigrationService
    ///
    /// Returns the migration result showing what was applied.
    pub fn run_migrations(&self) -> Result<MigrationResult> {
        let conn = self.lock()?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        self.run_migrations()?;
        Ok(())
    }
}

impl Store for DuckDbStore {
    fn register(&self, user: &User, account: &Account) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let email_taken: i64 = tx.query_row(
            "SELECT COUNT(*) FROM users WHERE email = ?",
            [&user.email],
            |row| row.get(0),
        )?;
        if email_taken > 0 {
            return Err(Error::DuplicateEmail(user.email.clone()));
        }

        tx.execute(
            "INSERT INTO users (user_id, name, email, created_at) VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                format_timestamp(&user.created_at),
            ],
        )?;

        tx.execute(
            "INSERT INTO accounts (account_id, account_number, user_id, pin_hash, balance,
                                   failed_attempts, is_locked, created_at, updated_at)
             VALUES (?, ?, ?, ?, CAST(? AS DECIMAL(18, 2)), ?, ?,
                     CAST(? AS TIMESTAMP), CAST(? AS TIMESTAMP))",
            params![
                account.id.to_string(),
                account.account_number,
                account.user_id.to_string(),
                account.pin_hash,
                account.balance.to_string(),
                account.failed_attempts as i32,
                account.locked,
                format_timestamp(&account.created_at),
                format_timestamp(&account.updated_at),
            ],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT user_id, name, email, created_at::VARCHAR FROM users WHERE email = ?",
                [User::normalize_email(email)],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, name, email, created_at)| -> Result<User> {
            Ok(User {
                id: parse_uuid(&id)?,
                name,
                email,
                created_at: parse_timestamp(&created_at),
            })
        })
        .transpose()
    }

    fn find_account(&self, account_number: &str) -> Result<Option<Account>> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!(
                    "SELECT {} FROM accounts WHERE account_number = ?",
                    ACCOUNT_COLUMNS
                ),
                [account_number],
                AccountRow::from_row,
            )
            .optional()?;

        row.map(AccountRow::into_account).transpose()
    }

    fn account_number_exists(&self, account_number: &str) -> Result<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE account_number = ?",
            [account_number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn update_auth_state(&self, account_id: Uuid, failed_attempts: u8, locked: bool) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE accounts
             SET failed_attempts = ?, is_locked = ?, updated_at = CAST(? AS TIMESTAMP)
             WHERE account_id = ?",
            params![
                failed_attempts as i32,
                locked,
                format_timestamp(&Utc::now()),
                account_id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("account {}", account_id)));
        }
        Ok(())
    }

    fn apply_movement(
        &self,
        account_id: Uuid,
        new_balance: Decimal,
        entry: NewTransaction,
    ) -> Result<Transaction> {
        let mut conn = self.lock()?;
        // Dropping `tx` without commit rolls both writes back
        let tx = conn.transaction()?;

        let updated = tx.execute(
            "UPDATE accounts
             SET balance = CAST(? AS DECIMAL(18, 2)), updated_at = CAST(? AS TIMESTAMP)
             WHERE account_id = ?",
            params![
                new_balance.to_string(),
                format_timestamp(&entry.created_at),
                account_id.to_string(),
            ],
        )?;
        if updated == 0 {
            return Err(Error::not_found(format!("account {}", account_id)));
        }

        let id: i64 = tx.query_row("SELECT nextval('seq_transaction_id')", [], |row| row.get(0))?;
        tx.execute(
            "INSERT INTO transactions (transaction_id, account_id, type, amount, balance_after, note, created_at)
             VALUES (?, ?, ?, CAST(? AS DECIMAL(18, 2)), CAST(? AS DECIMAL(18, 2)), ?, CAST(? AS TIMESTAMP))",
            params![
                id,
                account_id.to_string(),
                entry.kind.as_str(),
                entry.amount.to_string(),
                entry.balance_after.to_string(),
                entry.note,
                format_timestamp(&entry.created_at),
            ],
        )?;

        tx.commit()?;
        Ok(entry.into_transaction(id, account_id))
    }

    fn list_transactions(&self, account_id: Uuid, limit: usize) -> Result<Vec<Transaction>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM transactions
             WHERE account_id = ?
             ORDER BY transaction_id DESC
             LIMIT ?",
            TRANSACTION_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![account_id.to_string(), limit as i64], TransactionRow::from_row)?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    fn stats(&self) -> Result<BankStats> {
        let conn = self.lock()?;
        let (total_users, total_accounts, locked_accounts, total_balance): (i64, i64, i64, String) =
            conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM users),
                    (SELECT COUNT(*) FROM accounts),
                    (SELECT COUNT(*) FROM accounts WHERE is_locked),
                    (SELECT COALESCE(SUM(balance), 0) FROM accounts)::VARCHAR",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;

        Ok(BankStats {
            total_users,
            total_accounts,
            locked_accounts,
            total_balance: parse_decimal(&total_balance)?,
        })
    }
}

// Raw rows, converted outside the duckdb closure so parse failures
// surface as domain errors

struct AccountRow {
    id: String,
    account_number: String,
    user_id: String,
    pin_hash: String,
    balance: String,
    failed_attempts: i32,
    locked: bool,
    created_at: String,
    updated_at: String,
}

impl AccountRow {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_number: row.get(1)?,
            user_id: row.get(2)?,
            pin_hash: row.get(3)?,
            balance: row.get(4)?,
            failed_attempts: row.get(5)?,
            locked: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn into_account(self) -> Result<Account> {
        Ok(Account {
            id: parse_uuid(&self.id)?,
            account_number: self.account_number,
            user_id: parse_uuid(&self.user_id)?,
            pin_hash: self.pin_hash,
            balance: parse_decimal(&self.balance)?,
            failed_attempts: u8::try_from(self.failed_attempts)
                .unwrap_or(MAX_FAILED_ATTEMPTS)
                .min(MAX_FAILED_ATTEMPTS),
            locked: self.locked,
            created_at: parse_timestamp(&self.created_at),
            updated_at: parse_timestamp(&self.updated_at),
        })
    }
}

struct TransactionRow {
    id: i64,
    account_id: String,
    kind: String,
    amount: String,
    balance_after: String,
    note: Option<String>,
    created_at: String,
}

impl TransactionRow {
    fn from_row(row: &duckdb::Row) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            account_id: row.get(1)?,
            kind: row.get(2)?,
            amount: row.get(3)?,
            balance_after: row.get(4)?,
            note: row.get(5)?,
            created_at: row.get(6)?,
        })
    }

    fn into_transaction(self) -> Result<Transaction> {
        Ok(Transaction {
            id: self.id,
            account_id: parse_uuid(&self.account_id)?,
            kind: TransactionKind::from_str(&self.kind).map_err(Error::Database)?,
            amount: parse_decimal(&self.amount)?,
            balance_after: parse_decimal(&self.balance_after)?,
            note: self.note,
            created_at: parse_timestamp(&self.created_at),
        })
    }
}

// Helper functions

/// Naive UTC text that DuckDB casts straight to TIMESTAMP
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    // DuckDB renders TIMESTAMP as "2025-01-15 10:30:00.123456", dropping a zero fraction
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

fn parse_decimal(s: &str) -> Result<Decimal> {
    Decimal::from_str(s.trim()).map_err(|e| Error::database(format!("bad decimal '{}': {}", s, e)))
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| Error::database(format!("bad id '{}': {}", s, e)))
}
