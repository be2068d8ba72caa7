//! Ledger database migrations, embedded with include_str!
//!
//! Applied in list order by `MigrationService`; `000_migrations.sql`
//! bootstraps the bookkeeping table and must stay first.

/// (file name, SQL) pairs
///
/// New migration: add `NNN_description.sql` next to this file and append it here.
pub const MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    ("001_initial_schema.sql", include_str!("001_initial_schema.sql")),
];
