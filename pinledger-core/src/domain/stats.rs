//! Aggregate bank statistics for the admin dashboard

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BankStats {
    pub total_users: i64,
    pub total_accounts: i64,
    pub locked_accounts: i64,
    /// Sum of all account balances, zero when there are no accounts
    pub total_balance: Decimal,
}
