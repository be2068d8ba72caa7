//! Admin service - admin code check and bank-wide stats

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::BankStats;
use crate::ports::Store;

pub struct AdminService {
    store: Arc<dyn Store>,
    admin_code: String,
}

impl AdminService {
    pub fn new(store: Arc<dyn Store>, admin_code: impl Into<String>) -> Self {
        Self {
            store,
            admin_code: admin_code.into(),
        }
    }

    /// Fails with `AdminDenied` unless `code` matches the configured code
    pub fn verify_admin_code(&self, code: &str) -> Result<()> {
        if code.trim() == self.admin_code {
            Ok(())
        } else {
            Err(Error::AdminDenied)
        }
    }

    pub fn stats(&self) -> Result<BankStats> {
        self.store.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{registered, TestBank};
    use rust_decimal_macros::dec;

    #[test]
    fn test_admin_code() {
        let bank = TestBank::new();
        bank.admin.verify_admin_code("0666").unwrap();
        bank.admin.verify_admin_code(" 0666 ").unwrap();
        assert!(matches!(bank.admin.verify_admin_code("1234"), Err(Error::AdminDenied)));
        assert!(matches!(bank.admin.verify_admin_code(""), Err(Error::AdminDenied)));
    }

    #[test]
    fn test_stats_empty_bank() {
        let bank = TestBank::new();
        assert_eq!(bank.admin.stats().unwrap(), BankStats::default());
    }

    #[test]
    fn test_stats_counts_locked_and_sums_balances() {
        let bank = TestBank::new();
        let a = registered(&bank, "1234").account_number;
        let b = registered(&bank, "5678").account_number;
        bank.ledger.deposit(&a, dec!(100), None).unwrap();
        bank.ledger.deposit(&b, dec!(20.50), None).unwrap();
        for _ in 0..3 {
            let _ = bank.auth.authenticate(&b, "0000");
        }

        let stats = bank.admin.stats().unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_accounts, 2);
        assert_eq!(stats.locked_accounts, 1);
        assert_eq!(stats.total_balance, dec!(120.50));
    }
}
