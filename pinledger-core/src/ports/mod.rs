//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod hasher;
mod store;

pub use hasher::PinHasher;
pub use store::Store;
