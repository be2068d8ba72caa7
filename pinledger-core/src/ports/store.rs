//! Store port - persistence abstraction

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{Account, BankStats, NewTransaction, Transaction, User};

/// Persistence for users, accounts and the ledger
///
/// Calls are blocking. Implementations must make `register` and
/// `apply_movement` atomic: either every write lands or none does.
pub trait Store: Send + Sync {
    // === Users ===

    /// Insert a user together with its first account
    ///
    /// Fails with `DuplicateEmail` when the email is taken.
    fn register(&self, user: &User, account: &Account) -> Result<()>;

    /// Look up a user by normalized email
    fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    // === Accounts ===

    /// Look up an account by its public number
    fn find_account(&self, account_number: &str) -> Result<Option<Account>>;

    /// Check whether an account number is already taken
    fn account_number_exists(&self, account_number: &str) -> Result<bool> {
        Ok(self.find_account(account_number)?.is_some())
    }

    /// Persist the failed-attempt counter and lock flag
    fn update_auth_state(&self, account_id: Uuid, failed_attempts: u8, locked: bool) -> Result<()>;

    // === Ledger ===

    /// Set the new balance and append the matching ledger entry, atomically
    fn apply_movement(
        &self,
        account_id: Uuid,
        new_balance: Decimal,
        entry: NewTransaction,
    ) -> Result<Transaction>;

    /// Latest ledger entries for an account, newest first
    fn list_transactions(&self, account_id: Uuid, limit: usize) -> Result<Vec<Transaction>>;

    // === Admin ===

    /// Aggregate counts and balance sum
    fn stats(&self) -> Result<BankStats>;
}
