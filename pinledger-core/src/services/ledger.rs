//! Ledger service - deposits, withdrawals and history

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::domain::result::{Error, Result};
use crate::domain::{is_valid_amount, Account, MAX_AMOUNT, NewTransaction, Transaction, TransactionKind};
use crate::ports::Store;

/// Balance mutation and ledger reads
///
/// Callers authenticate through `AuthService` first; this service trusts
/// the account number it is given.
pub struct LedgerService {
    store: Arc<dyn Store>,
}

impl LedgerService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Add funds. Returns the new balance.
    pub fn deposit(&self, account_number: &str, amount: Decimal, note: Option<&str>) -> Result<Decimal> {
        self.move_funds(account_number, TransactionKind::Deposit, amount, note)
    }

    /// Remove funds. Returns the new balance.
    ///
    /// Fails with `InsufficientFunds` without writing anything when the
    /// balance does not cover the amount.
    pub fn withdraw(&self, account_number: &str, amount: Decimal, note: Option<&str>) -> Result<Decimal> {
        self.move_funds(account_number, TransactionKind::Withdraw, amount, note)
    }

    pub fn get_balance(&self, account_number: &str) -> Result<Decimal> {
        Ok(self.load(account_number)?.balance)
    }

    /// Latest `limit` ledger entries, newest first
    pub fn list_transactions(&self, account_number: &str, limit: usize) -> Result<Vec<Transaction>> {
        let account = self.load(account_number)?;
        self.store.list_transactions(account.id, limit)
    }

    fn move_funds(
        &self,
        account_number: &str,
        kind: TransactionKind,
        amount: Decimal,
        note: Option<&str>,
    ) -> Result<Decimal> {
        if !is_valid_amount(amount) {
            return Err(Error::InvalidAmount);
        }

        let account = self.load(account_number)?;
        let new_balance = match kind {
            // The resulting balance has the same column bound as an amount
            TransactionKind::Deposit => account
                .balance
                .checked_add(amount)
                .filter(|balance| *balance <= MAX_AMOUNT)
                .ok_or(Error::InvalidAmount)?,
            TransactionKind::Withdraw => {
                if account.balance < amount {
                    return Err(Error::InsufficientFunds);
                }
                account.balance.checked_sub(amount).ok_or(Error::InvalidAmount)?
            }
        };

        let entry = NewTransaction::new(kind, amount, new_balance, note.map(str::to_string));
        let stored = self.store.apply_movement(account.id, new_balance, entry)?;
        Ok(stored.balance_after)
    }

    fn load(&self, account_number: &str) -> Result<Account> {
        self.store
            .find_account(account_number.trim())?
            .ok_or_else(|| Error::not_found(format!("account {}", account_number.trim())))
    }
}
