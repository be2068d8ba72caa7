//! User domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered bank customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique, stored normalized (trimmed, lowercase)
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().trim().to_string(),
            email: Self::normalize_email(email),
            created_at: Utc::now(),
        }
    }

    /// Normalize an email for storage and lookup
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Validate user data
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() {
            return Err("name cannot be empty");
        }
        if self.email.is_empty() {
            return Err("email cannot be empty");
        }
        match self.email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
            _ => Err("email must look like name@domain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation_normalizes() {
        let user = User::new("  Ada Lovelace ", " Ada@Example.COM ");
        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.email, "ada@example.com");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_user_validation() {
        assert!(User::new("", "a@b.c").validate().is_err());
        assert!(User::new("Ada", "").validate().is_err());
        assert!(User::new("Ada", "no-at-sign").validate().is_err());
        assert!(User::new("Ada", "@example.com").validate().is_err());
    }
}
