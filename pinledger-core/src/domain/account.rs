//! Account domain model

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Consecutive wrong PINs that lock an account
pub const MAX_FAILED_ATTEMPTS: u8 = 3;

/// Length of a generated account number
pub const ACCOUNT_NUMBER_LEN: usize = 10;

/// PIN length bounds (digits only)
pub const MIN_PIN_LEN: usize = 4;
pub const MAX_PIN_LEN: usize = 12;

/// A PIN-protected bank account owned by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub user_id: Uuid,
    /// PHC-format hash, never the PIN itself
    #[serde(skip_serializing)]
    pub pin_hash: String,
    /// Never negative
    pub balance: Decimal,
    /// 0..=MAX_FAILED_ATTEMPTS
    pub failed_attempts: u8,
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of recording a wrong PIN against an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAttempt {
    /// Still unlocked, this many tries remain
    Remaining(u8),
    /// This attempt reached the limit and locked the account
    LockedNow,
}

impl Account {
    /// Create a new, empty, unlocked account
    pub fn new(user_id: Uuid, account_number: impl Into<String>, pin_hash: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_number: account_number.into(),
            user_id,
            pin_hash: pin_hash.into(),
            balance: Decimal::ZERO,
            failed_attempts: 0,
            locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generate a candidate account number: ten digits, first digit non-zero
    pub fn generate_number() -> String {
        let mut rng = rand::thread_rng();
        let mut number = String::with_capacity(ACCOUNT_NUMBER_LEN);
        number.push(char::from(b'0' + rng.gen_range(1..=9u8)));
        for _ in 1..ACCOUNT_NUMBER_LEN {
            number.push(char::from(b'0' + rng.gen_range(0..=9u8)));
        }
        number
    }

    /// Check PIN format: ASCII digits, MIN_PIN_LEN..=MAX_PIN_LEN long
    pub fn validate_pin(pin: &str) -> Result<(), &'static str> {
        if pin.len() < MIN_PIN_LEN {
            return Err("PIN must be at least 4 digits");
        }
        if pin.len() > MAX_PIN_LEN {
            return Err("PIN must be at most 12 digits");
        }
        if !pin.chars().all(|c| c.is_ascii_digit()) {
            return Err("PIN must contain digits only");
        }
        Ok(())
    }

    /// Record a wrong PIN. Locks the account once the limit is reached.
    pub fn record_failed_attempt(&mut self) -> FailedAttempt {
        self.failed_attempts = self.failed_attempts.saturating_add(1).min(MAX_FAILED_ATTEMPTS);
        self.updated_at = Utc::now();
        if self.failed_attempts >= MAX_FAILED_ATTEMPTS {
            self.locked = true;
            FailedAttempt::LockedNow
        } else {
            FailedAttempt::Remaining(MAX_FAILED_ATTEMPTS - self.failed_attempts)
        }
    }

    /// Clear the lock and the failed-attempt counter
    pub fn reset_auth_state(&mut self) {
        self.failed_attempts = 0;
        self.locked = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_number_shape() {
        for _ in 0..200 {
            let number = Account::generate_number();
            assert_eq!(number.len(), ACCOUNT_NUMBER_LEN);
            assert!(number.chars().all(|c| c.is_ascii_digit()));
            assert!(!number.starts_with('0'));
        }
    }

    #[test]
    fn test_pin_validation() {
        assert!(Account::validate_pin("1234").is_ok());
        assert!(Account::validate_pin("123456789012").is_ok());
        assert!(Account::validate_pin("123").is_err());
        assert!(Account::validate_pin("1234567890123").is_err());
        assert!(Account::validate_pin("12a4").is_err());
        assert!(Account::validate_pin("").is_err());
    }

    #[test]
    fn test_failed_attempts_lock_on_third() {
        let mut account = Account::new(Uuid::new_v4(), "1000000001", "hash");
        assert_eq!(account.record_failed_attempt(), FailedAttempt::Remaining(2));
        assert_eq!(account.record_failed_attempt(), FailedAttempt::Remaining(1));
        assert!(!account.locked);
        assert_eq!(account.record_failed_attempt(), FailedAttempt::LockedNow);
        assert!(account.locked);
        assert_eq!(account.failed_attempts, MAX_FAILED_ATTEMPTS);
    }

    #[test]
    fn test_reset_auth_state() {
        let mut account = Account::new(Uuid::new_v4(), "1000000001", "hash");
        for _ in 0..3 {
            account.record_failed_attempt();
        }
        account.reset_auth_state();
        assert!(!account.locked);
        assert_eq!(account.failed_attempts, 0);
    }

    #[test]
    fn test_pin_hash_not_serialized() {
        let account = Account::new(Uuid::new_v4(), "1000000001", "secret-hash");
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
