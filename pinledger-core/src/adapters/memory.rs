//! In-memory store
//!
//! Keeps users, accounts and the ledger in maps behind one mutex. Every
//! operation validates before it mutates, so a failed call leaves no trace.
//! Test double for the service unit tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, BankStats, NewTransaction, Transaction, User};
use crate::ports::Store;

#[derive(Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    /// normalized email -> user id
    emails: HashMap<String, Uuid>,
    accounts: HashMap<Uuid, Account>,
    /// account number -> account id
    numbers: HashMap<String, Uuid>,
    /// Append-only, in insert order
    transactions: Vec<Transaction>,
    next_transaction_id: i64,
}

/// `Store` implementation backed by process memory
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    /// Number of ledger rows across all accounts
    pub fn transaction_count(&self) -> Result<usize> {
        Ok(self.lock()?.transactions.len())
    }
}

impl Store for MemoryStore {
    fn register(&self, user: &User, account: &Account) -> Result<()> {
        let mut state = self.lock()?;

        if state.emails.contains_key(&user.email) {
            return Err(Error::DuplicateEmail(user.email.clone()));
        }
        if state.numbers.contains_key(&account.account_number) {
            return Err(Error::database(format!(
                "account number already exists: {}",
                account.account_number
            )));
        }

        state.emails.insert(user.email.clone(), user.id);
        state.users.insert(user.id, user.clone());
        state.numbers.insert(account.account_number.clone(), account.id);
        state.accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let state = self.lock()?;
        let email = User::normalize_email(email);
        Ok(state
            .emails
            .get(&email)
            .and_then(|id| state.users.get(id))
            .cloned())
    }

    fn find_account(&self, account_number: &str) -> Result<Option<Account>> {
        let state = self.lock()?;
        Ok(state
            .numbers
            .get(account_number)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    fn update_auth_state(&self, account_id: Uuid, failed_attempts: u8, locked: bool) -> Result<()> {
        let mut state = self.lock()?;
        let account = state
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| Error::not_found(format!("account {}", account_id)))?;
        account.failed_attempts = failed_attempts;
        account.locked = locked;
        account.updated_at = Utc::now();
        Ok(())
    }

    fn apply_movement(
        &self,
        account_id: Uuid,
        new_balance: Decimal,
        entry: NewTransaction,
    ) -> Result<Transaction> {
        if new_balance < Decimal::ZERO {
            return Err(Error::database("balance cannot be negative"));
        }

        let mut state = self.lock()?;
        let account = state
            .accounts
            .get_mut(&account_id)
            .ok_or_else(|| Error::not_found(format!("account {}", account_id)))?;
        account.balance = new_balance;
        account.updated_at = Utc::now();

        state.next_transaction_id += 1;
        let transaction = entry.into_transaction(state.next_transaction_id, account_id);
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    fn list_transactions(&self, account_id: Uuid, limit: usize) -> Result<Vec<Transaction>> {
        let state = self.lock()?;
        Ok(state
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.account_id == account_id)
            .take(limit)
            .cloned()
            .collect())
    }

    fn stats(&self) -> Result<BankStats> {
        let state = self.lock()?;
        Ok(BankStats {
            total_users: state.users.len() as i64,
            total_accounts: state.accounts.len() as i64,
            locked_accounts: state.accounts.values().filter(|a| a.locked).count() as i64,
            total_balance: state.accounts.values().map(|a| a.balance).sum(),
        })
    }
}
