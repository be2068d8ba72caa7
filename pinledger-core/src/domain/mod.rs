//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
mod stats;
mod transaction;
mod user;
pub mod result;

pub use account::{
    Account, FailedAttempt, ACCOUNT_NUMBER_LEN, MAX_FAILED_ATTEMPTS, MAX_PIN_LEN, MIN_PIN_LEN,
};
pub use stats::BankStats;
pub use transaction::{
    is_valid_amount, NewTransaction, Transaction, TransactionKind, AMOUNT_SCALE, MAX_AMOUNT,
};
pub use user::User;
