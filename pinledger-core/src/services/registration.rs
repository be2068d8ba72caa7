//! Registration service - new users and their accounts

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::{Account, User};
use crate::ports::{PinHasher, Store};

/// Attempts at finding an unused account number before giving up
const MAX_NUMBER_ATTEMPTS: usize = 10;

type NumberGenerator = Box<dyn Fn() -> String + Send + Sync>;

/// A freshly registered user and account
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub user: User,
    pub account: Account,
}

pub struct RegistrationService {
    store: Arc<dyn Store>,
    hasher: Arc<dyn PinHasher>,
    generate_number: NumberGenerator,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn Store>, hasher: Arc<dyn PinHasher>) -> Self {
        Self {
            store,
            hasher,
            generate_number: Box::new(Account::generate_number),
        }
    }

    /// Replace the account number source
    pub fn with_number_generator(
        mut self,
        generator: impl Fn() -> String + Send + Sync + 'static,
    ) -> Self {
        self.generate_number = Box::new(generator);
        self
    }

    /// Create a user and an empty, unlocked account for them
    pub fn register(&self, name: &str, email: &str, pin: &str) -> Result<Registration> {
        let user = User::new(name, email);
        user.validate().map_err(Error::validation)?;
        Account::validate_pin(pin).map_err(Error::validation)?;

        if self.store.find_user_by_email(&user.email)?.is_some() {
            return Err(Error::DuplicateEmail(user.email));
        }

        let pin_hash = self.hasher.hash(pin)?;
        let account_number = self.allocate_number()?;
        let account = Account::new(user.id, account_number, pin_hash);

        self.store.register(&user, &account)?;
        Ok(Registration { user, account })
    }

    fn allocate_number(&self) -> Result<String> {
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let candidate = (self.generate_number)();
            if !self.store.account_number_exists(&candidate)? {
                return Ok(candidate);
            }
        }
        Err(Error::database(format!(
            "no free account number after {} attempts",
            MAX_NUMBER_ATTEMPTS
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStore;
    use crate::services::test_support::{PlainHasher, TestBank};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_creates_empty_account() {
        let bank = TestBank::new();
        let reg = bank
            .registration
            .register("Ada Lovelace", "Ada@Example.com", "1234")
            .unwrap();

        assert_eq!(reg.user.email, "ada@example.com");
        assert_eq!(reg.account.user_id, reg.user.id);
        assert_eq!(reg.account.account_number.len(), 10);
        assert!(!reg.account.account_number.starts_with('0'));
        assert_ne!(reg.account.pin_hash, "1234");

        let stored = bank.store.find_account(&reg.account.account_number).unwrap().unwrap();
        assert_eq!(stored.failed_attempts, 0);
        assert!(!stored.locked);
        assert!(stored.balance.is_zero());
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let bank = TestBank::new();
        bank.registration.register("Ada", "ada@example.com", "1234").unwrap();

        let result = bank.registration.register("Other", " ADA@example.com ", "5678");
        assert!(matches!(result, Err(Error::DuplicateEmail(_))));
        assert_eq!(bank.store.stats().unwrap().total_accounts, 1);
    }

    #[test]
    fn test_validation() {
        let bank = TestBank::new();
        for (name, email, pin) in [
            ("", "a@b.c", "1234"),
            ("Ada", "not-an-email", "1234"),
            ("Ada", "a@b.c", "12"),
            ("Ada", "a@b.c", "12ab"),
        ] {
            assert!(
                matches!(bank.registration.register(name, email, pin), Err(Error::Validation(_))),
                "expected validation error for {:?}",
                (name, email, pin)
            );
        }
        assert_eq!(bank.store.stats().unwrap().total_users, 0);
    }

    #[test]
    fn test_retries_taken_numbers() {
        let store = Arc::new(MemoryStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let service = RegistrationService::new(store.clone(), Arc::new(PlainHasher))
            .with_number_generator(move || {
                // Calls 2 and 3 collide with the first registration
                if counter.fetch_add(1, Ordering::SeqCst) < 3 {
                    "1111111111".to_string()
                } else {
                    "2222222222".to_string()
                }
            });

        let first = service.register("Ada", "ada@example.com", "1234").unwrap();
        let second = service.register("Bob", "bob@example.com", "1234").unwrap();
        assert_eq!(first.account.account_number, "1111111111");
        assert_eq!(second.account.account_number, "2222222222");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_gives_up_when_numbers_exhausted() {
        let store = Arc::new(MemoryStore::new());
        let service = RegistrationService::new(store.clone(), Arc::new(PlainHasher))
            .with_number_generator(|| "1111111111".to_string());

        service.register("Ada", "ada@example.com", "1234").unwrap();
        let result = service.register("Bob", "bob@example.com", "1234");
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(store.find_user_by_email("bob@example.com").unwrap().is_none());
    }
}
