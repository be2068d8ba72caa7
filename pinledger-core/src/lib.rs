//! PinLedger Core - business logic for a PIN-protected banking ledger
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (User, Account, Transaction, etc.)
//! - **ports**: Trait definitions for external dependencies (Store, PinHasher)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (DuckDB, in-memory, Argon2)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::{Argon2Hasher, DuckDbStore};
use config::Config;
use ports::{PinHasher, Store};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{Account, BankStats, Transaction, TransactionKind, User};
pub use services::{Authenticated, EntryPoint, LogEntry, LogEvent, LoggingService, Registration};

/// File name of the ledger database inside the data directory
pub const DB_FILENAME: &str = "pinledger.duckdb";

/// Main context for PinLedger operations
///
/// Holds the configuration, the store and every service built on it.
pub struct PinLedgerContext {
    pub config: Config,
    pub store: Arc<dyn Store>,
    pub auth_service: AuthService,
    pub ledger_service: LedgerService,
    pub registration_service: RegistrationService,
    pub admin_service: AdminService,
    pub export_service: ExportService,
}

impl PinLedgerContext {
    /// Open the ledger in `data_dir`, creating the database if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)?;
        let config = Config::load(data_dir)?;

        let store = DuckDbStore::new(&data_dir.join(DB_FILENAME))?;
        store.ensure_schema()?;

        Ok(Self::with_store(
            config,
            Arc::new(store),
            Arc::new(Argon2Hasher::new()),
        ))
    }

    /// Wire services around an existing store and hasher
    pub fn with_store(config: Config, store: Arc<dyn Store>, hasher: Arc<dyn PinHasher>) -> Self {
        let auth_service = AuthService::new(Arc::clone(&store), Arc::clone(&hasher));
        let ledger_service = LedgerService::new(Arc::clone(&store));
        let registration_service = RegistrationService::new(Arc::clone(&store), hasher);
        let admin_service = AdminService::new(Arc::clone(&store), config.admin_code.clone());
        let export_service = ExportService::new(Arc::clone(&store));

        Self {
            config,
            store,
            auth_service,
            ledger_service,
            registration_service,
            admin_service,
            export_service,
        }
    }
}
