//! PIN hasher port - one-way credential hashing

use crate::domain::result::Result;

/// One-way hashing for PINs
pub trait PinHasher: Send + Sync {
    /// Hash a PIN into a self-describing string (salt included)
    fn hash(&self, pin: &str) -> Result<String>;

    /// Check a PIN against a stored hash
    ///
    /// A mismatch is `Ok(false)`; `Err` means the hash could not be read.
    fn verify(&self, pin: &str, hash: &str) -> Result<bool>;
}
