//! Auth service - PIN verification with failed-attempt lockout

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, FailedAttempt};
use crate::ports::{PinHasher, Store};

/// Proof of a successful PIN check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authenticated {
    pub account_id: Uuid,
    pub account_number: String,
    pub user_id: Uuid,
}

/// Gatekeeper for account access
pub struct AuthService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PinHasher>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PinHasher>) -> Self {
        Self { store, hasher }
    }

    /// Check a PIN against an account
    ///
    /// A locked account is rejected before the PIN is looked at. A wrong PIN
    /// bumps the failed-attempt counter and the third one locks the account.
    /// A correct PIN clears the counter.
    pub fn authenticate(&self, account_number: &str, pin: &str) -> Result<Authenticated> {
        let mut account = self.load(account_number)?;

        if account.locked {
            return Err(Error::Locked);
        }

        if !self.hasher.verify(pin, &account.pin_hash)? {
            let outcome = account.record_failed_attempt();
            self.store
                .update_auth_state(account.id, account.failed_attempts, account.locked)?;
            return Err(match outcome {
                FailedAttempt::LockedNow => Error::LockedJustNow,
                FailedAttempt::Remaining(attempts_left) => Error::WrongPin { attempts_left },
            });
        }

        if account.failed_attempts > 0 {
            account.reset_auth_state();
            self.store.update_auth_state(account.id, 0, false)?;
        }

        Ok(Authenticated {
            account_id: account.id,
            account_number: account.account_number,
            user_id: account.user_id,
        })
    }

    /// Clear the lock and the failed-attempt counter. Idempotent.
    pub fn unlock(&self, account_number: &str) -> Result<()> {
        let account = self.load(account_number)?;
        self.store.update_auth_state(account.id, 0, false)
    }

    pub fn is_locked(&self, account_number: &str) -> Result<bool> {
        Ok(self.load(account_number)?.locked)
    }

    fn load(&self, account_number: &str) -> Result<Account> {
        self.store
            .find_account(account_number.trim())?
            .ok_or_else(|| Error::not_found(format!("account {}", account_number.trim())))
    }
}
