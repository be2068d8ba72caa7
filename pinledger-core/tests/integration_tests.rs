//! Integration tests for pinledger-core services
//!
//! These tests run the services against a real DuckDB file in a temp
//! directory. Hashing uses cheap Argon2 parameters.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

use pinledger_core::adapters::{Argon2Hasher, DuckDbStore, HashParams};
use pinledger_core::config::Config;
use pinledger_core::domain::MAX_AMOUNT;
use pinledger_core::ports::Store;
use pinledger_core::{Error, PinLedgerContext, TransactionKind, DB_FILENAME};

// ============================================================================
// Test Helpers
// ============================================================================

fn cheap_hasher() -> Arc<Argon2Hasher> {
    let params = HashParams {
        memory_cost: 1024,
        time_cost: 1,
        parallelism: 1,
    };
    Arc::new(Argon2Hasher::with_params(params).expect("valid params"))
}

/// Open (or reopen) a context on the database file in `dir`
fn open_context(dir: &Path) -> PinLedgerContext {
    let store = DuckDbStore::new(&dir.join(DB_FILENAME)).expect("Failed to open store");
    store.ensure_schema().expect("Failed to initialize schema");
    PinLedgerContext::with_store(Config::default(), Arc::new(store), cheap_hasher())
}

fn register(ctx: &PinLedgerContext, email: &str, pin: &str) -> String {
    ctx.registration_service
        .register("Test User", email, pin)
        .expect("registration failed")
        .account
        .account_number
}

// ============================================================================
// Lockout
// ============================================================================

#[test]
fn test_lockout_and_admin_unlock() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");

    assert!(matches!(
        ctx.auth_service.authenticate(&number, "0000"),
        Err(Error::WrongPin { attempts_left: 2 })
    ));
    assert!(matches!(
        ctx.auth_service.authenticate(&number, "1111"),
        Err(Error::WrongPin { attempts_left: 1 })
    ));
    assert!(matches!(
        ctx.auth_service.authenticate(&number, "2222"),
        Err(Error::LockedJustNow)
    ));
    assert!(matches!(
        ctx.auth_service.authenticate(&number, "4321"),
        Err(Error::Locked)
    ));
    assert_eq!(ctx.admin_service.stats().unwrap().locked_accounts, 1);

    ctx.admin_service.verify_admin_code("0666").unwrap();
    ctx.auth_service.unlock(&number).unwrap();

    let auth = ctx.auth_service.authenticate(&number, "4321").unwrap();
    assert_eq!(auth.account_number, number);

    let account = ctx.store.find_account(&number).unwrap().unwrap();
    assert_eq!(account.failed_attempts, 0);
    assert!(!account.locked);
}

#[test]
fn test_lock_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let number = {
        let ctx = open_context(temp_dir.path());
        let number = register(&ctx, "ada@example.com", "4321");
        for _ in 0..3 {
            let _ = ctx.auth_service.authenticate(&number, "0000");
        }
        number
    };

    let ctx = open_context(temp_dir.path());
    assert!(ctx.auth_service.is_locked(&number).unwrap());
    assert!(matches!(
        ctx.auth_service.authenticate(&number, "4321"),
        Err(Error::Locked)
    ));
}

// ============================================================================
// Ledger atomicity
// ============================================================================

#[test]
fn test_deposit_withdraw_ledger() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");

    assert_eq!(ctx.ledger_service.deposit(&number, dec!(100), None).unwrap(), dec!(100));
    assert_eq!(ctx.ledger_service.withdraw(&number, dec!(40), None).unwrap(), dec!(60));
    assert_eq!(ctx.ledger_service.get_balance(&number).unwrap(), dec!(60));

    let txs = ctx.ledger_service.list_transactions(&number, 10).unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].kind, TransactionKind::Withdraw);
    assert_eq!(txs[0].balance_after, dec!(60));
    assert_eq!(txs[1].kind, TransactionKind::Deposit);
    assert_eq!(txs[1].balance_after, dec!(100));
}

#[test]
fn test_overdraw_leaves_no_trace() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");
    ctx.ledger_service.deposit(&number, dec!(20), None).unwrap();

    let result = ctx.ledger_service.withdraw(&number, dec!(20.01), None);
    assert!(matches!(result, Err(Error::InsufficientFunds)));

    assert_eq!(ctx.ledger_service.get_balance(&number).unwrap(), dec!(20));
    assert_eq!(ctx.ledger_service.list_transactions(&number, 10).unwrap().len(), 1);
}

#[test]
fn test_fractional_amounts_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");

    ctx.ledger_service.deposit(&number, dec!(0.10), None).unwrap();
    ctx.ledger_service.deposit(&number, dec!(0.20), None).unwrap();
    assert_eq!(ctx.ledger_service.get_balance(&number).unwrap(), dec!(0.30));

    let txs = ctx.ledger_service.list_transactions(&number, 1).unwrap();
    assert_eq!(txs[0].amount, dec!(0.20));
}

#[test]
fn test_amounts_beyond_column_range_are_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");

    assert!(matches!(
        ctx.ledger_service.deposit(&number, dec!(100000000000000000), None),
        Err(Error::InvalidAmount)
    ));

    assert_eq!(ctx.ledger_service.deposit(&number, MAX_AMOUNT, None).unwrap(), MAX_AMOUNT);
    assert!(matches!(
        ctx.ledger_service.deposit(&number, dec!(1), None),
        Err(Error::InvalidAmount)
    ));
    assert_eq!(ctx.ledger_service.get_balance(&number).unwrap(), MAX_AMOUNT);
    assert_eq!(ctx.ledger_service.list_transactions(&number, 10).unwrap().len(), 1);
}

#[test]
fn test_ledger_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let number = {
        let ctx = open_context(temp_dir.path());
        let number = register(&ctx, "ada@example.com", "4321");
        ctx.ledger_service.deposit(&number, dec!(75), Some("salary")).unwrap();
        number
    };

    let ctx = open_context(temp_dir.path());
    assert_eq!(ctx.ledger_service.get_balance(&number).unwrap(), dec!(75));
    let txs = ctx.ledger_service.list_transactions(&number, 10).unwrap();
    assert_eq!(txs[0].note.as_deref(), Some("salary"));

    // New entries keep sorting after the old ones
    ctx.ledger_service.withdraw(&number, dec!(5), None).unwrap();
    let txs = ctx.ledger_service.list_transactions(&number, 10).unwrap();
    assert_eq!(txs[0].kind, TransactionKind::Withdraw);
    assert!(txs[0].id > txs[1].id);
}

#[test]
fn test_accounts_do_not_share_history() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let a = register(&ctx, "a@example.com", "1111");
    let b = register(&ctx, "b@example.com", "2222");

    ctx.ledger_service.deposit(&a, dec!(10), None).unwrap();
    ctx.ledger_service.deposit(&b, dec!(20), None).unwrap();
    ctx.ledger_service.deposit(&a, dec!(30), None).unwrap();

    let a_txs = ctx.ledger_service.list_transactions(&a, 10).unwrap();
    assert_eq!(a_txs.len(), 2);
    assert_eq!(ctx.ledger_service.get_balance(&b).unwrap(), dec!(20));

    let stats = ctx.admin_service.stats().unwrap();
    assert_eq!(stats.total_accounts, 2);
    assert_eq!(stats.total_balance, dec!(60));
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_duplicate_email_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    register(&ctx, "ada@example.com", "4321");

    let result = ctx
        .registration_service
        .register("Someone Else", "ADA@example.com", "9999");
    assert!(matches!(result, Err(Error::DuplicateEmail(_))));
    assert_eq!(ctx.admin_service.stats().unwrap().total_users, 1);
}

#[test]
fn test_pin_is_never_stored_in_clear() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");

    let account = ctx.store.find_account(&number).unwrap().unwrap();
    assert!(account.pin_hash.starts_with("$argon2id$"));
    assert!(!account.pin_hash.contains("4321"));
}

// ============================================================================
// Export
// ============================================================================

#[test]
fn test_export_statement() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = open_context(temp_dir.path());
    let number = register(&ctx, "ada@example.com", "4321");
    ctx.ledger_service.deposit(&number, dec!(12.5), None).unwrap();

    let out_dir = temp_dir.path().join("statements");
    let path = ctx
        .export_service
        .export_csv(&number, 50, &out_dir)
        .unwrap()
        .expect("statement written");

    let content = std::fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("created_at,type,amount,balance_after,note"));
    let row = lines.next().unwrap();
    assert!(row.contains(",DEPOSIT,12.50,12.50,Deposit made"));
    assert!(lines.next().is_none());
}

// ============================================================================
// Context
// ============================================================================

#[test]
fn test_context_new_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("nested").join("data");

    let ctx = PinLedgerContext::new(&data_dir).unwrap();
    assert!(data_dir.join(DB_FILENAME).exists());
    assert_eq!(ctx.config.history_limit, 10);
    assert_eq!(ctx.admin_service.stats().unwrap().total_balance, Decimal::ZERO);
}

#[test]
fn test_migrations_are_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join(DB_FILENAME);

    let store = DuckDbStore::new(&db_path).unwrap();
    let first = store.run_migrations().unwrap();
    assert!(!first.applied.is_empty());
    drop(store);

    let store = DuckDbStore::new(&db_path).unwrap();
    let second = store.run_migrations().unwrap();
    assert!(second.applied.is_empty());
    assert_eq!(second.already_applied, first.applied.len());
}
