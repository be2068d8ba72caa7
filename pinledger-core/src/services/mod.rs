//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod admin;
mod auth;
mod export;
mod ledger;
pub mod logging;
pub mod migration;
mod registration;

pub use admin::AdminService;
pub use auth::{AuthService, Authenticated};
pub use export::{ExportService, DEFAULT_EXPORT_LIMIT};
pub use ledger::LedgerService;
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use migration::{MigrationResult, MigrationService};
pub use registration::{Registration, RegistrationService};
