//! Event log migrations for logs.duckdb
//!
//! Kept apart from the ledger migrations so the log can be cleared or
//! deleted without touching account data.

/// (file name, SQL) pairs, applied in order
pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
