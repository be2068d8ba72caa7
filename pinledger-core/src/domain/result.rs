//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is recoverable: the caller reports it and re-prompts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Account is locked. Contact an administrator.")]
    Locked,

    #[error("Account locked after too many failed PIN attempts")]
    LockedJustNow,

    #[error("Wrong PIN. Attempts left: {attempts_left}")]
    WrongPin { attempts_left: u8 },

    #[error("Amount must be positive with at most two decimal places")]
    InvalidAmount,

    #[error("Insufficient funds")]
    InsufficientFunds,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Incorrect admin code")]
    AdminDenied,

    #[error("Hashing error: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a database error
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Stable machine-readable code, used in JSON output and log entries
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Locked => "locked",
            Error::LockedJustNow => "locked_just_now",
            Error::WrongPin { .. } => "wrong_pin",
            Error::InvalidAmount => "invalid_amount",
            Error::InsufficientFunds => "insufficient_funds",
            Error::Validation(_) => "validation",
            Error::DuplicateEmail(_) => "duplicate_email",
            Error::AdminDenied => "admin_denied",
            Error::Hashing(_) => "hashing",
            Error::Database(_) => "database",
            Error::Io(_) => "io",
            Error::Csv(_) => "csv",
            Error::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => {
                let mut context = HashMap::new();
                context.insert("code".to_string(), serde_json::Value::from(e.code()));
                if let Error::WrongPin { attempts_left } = &e {
                    context.insert(
                        "attempts_left".to_string(),
                        serde_json::Value::from(*attempts_left),
                    );
                }
                Self::fail_with_context(e.to_string(), context)
            }
        }
    }
}
