//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Store port
//! - An in-process map-backed Store for tests and throwaway sessions
//! - Argon2id for the PinHasher port

pub mod argon2_hasher;
pub mod duckdb;
pub mod memory;

pub use argon2_hasher::{Argon2Hasher, HashParams};
pub use self::duckdb::DuckDbStore;
pub use memory::MemoryStore;
