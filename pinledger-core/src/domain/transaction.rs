//! Transaction domain model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fractional digits allowed on a money amount
pub const AMOUNT_SCALE: u32 = 2;

/// Largest amount or balance a `DECIMAL(18, 2)` column holds: 9999999999999999.99
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, AMOUNT_SCALE);

/// Direction of a balance movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Withdraw,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "DEPOSIT",
            TransactionKind::Withdraw => "WITHDRAW",
        }
    }

    /// Note recorded when the caller supplies none
    pub fn default_note(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit made",
            TransactionKind::Withdraw => "Withdrawal made",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "DEPOSIT" => Ok(TransactionKind::Deposit),
            "WITHDRAW" => Ok(TransactionKind::Withdraw),
            other => Err(format!("unknown transaction type: {}", other)),
        }
    }
}

/// A ledger entry as stored. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the store, increases with every insert
    pub id: i64,
    pub account_id: Uuid,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Account balance right after this movement
    pub balance_after: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A ledger entry waiting to be written alongside its balance update
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewTransaction {
    pub fn new(kind: TransactionKind, amount: Decimal, balance_after: Decimal, note: Option<String>) -> Self {
        let note = note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| kind.default_note().to_string());
        Self {
            kind,
            amount,
            balance_after,
            note: Some(note),
            created_at: Utc::now(),
        }
    }

    /// Attach the store-assigned id
    pub fn into_transaction(self, id: i64, account_id: Uuid) -> Transaction {
        Transaction {
            id,
            account_id,
            kind: self.kind,
            amount: self.amount,
            balance_after: self.balance_after,
            note: self.note,
            created_at: self.created_at,
        }
    }
}

/// A movement amount must be positive, at most `MAX_AMOUNT`, and carry at
/// most two decimal places
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= MAX_AMOUNT && amount.normalize().scale() <= AMOUNT_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_validation() {
        assert!(is_valid_amount(dec!(0.01)));
        assert!(is_valid_amount(dec!(100)));
        assert!(is_valid_amount(dec!(12.50)));
        // Trailing zeros beyond the scale are harmless
        assert!(is_valid_amount(dec!(1.2300)));

        assert!(!is_valid_amount(dec!(0)));
        assert!(!is_valid_amount(dec!(-5)));
        assert!(!is_valid_amount(dec!(0.001)));
    }

    #[test]
    fn test_amount_upper_bound() {
        assert_eq!(MAX_AMOUNT, dec!(9999999999999999.99));
        assert!(is_valid_amount(MAX_AMOUNT));
        assert!(!is_valid_amount(MAX_AMOUNT + dec!(0.01)));
        assert!(!is_valid_amount(dec!(10000000000000000)));
        assert!(!is_valid_amount(Decimal::MAX));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("deposit".parse::<TransactionKind>().unwrap(), TransactionKind::Deposit);
        assert_eq!("WITHDRAW".parse::<TransactionKind>().unwrap(), TransactionKind::Withdraw);
        assert!("transfer".parse::<TransactionKind>().is_err());
        assert_eq!(TransactionKind::Withdraw.to_string(), "WITHDRAW");
    }

    #[test]
    fn test_default_note() {
        let entry = NewTransaction::new(TransactionKind::Deposit, dec!(5), dec!(5), None);
        assert_eq!(entry.note.as_deref(), Some("Deposit made"));

        let entry = NewTransaction::new(TransactionKind::Withdraw, dec!(5), dec!(0), Some("  ".into()));
        assert_eq!(entry.note.as_deref(), Some("Withdrawal made"));

        let entry = NewTransaction::new(TransactionKind::Withdraw, dec!(5), dec!(0), Some("rent".into()));
        assert_eq!(entry.note.as_deref(), Some("rent"));
    }

    #[test]
    fn test_serializes_kind_as_type() {
        let tx = NewTransaction::new(TransactionKind::Deposit, dec!(10), dec!(10), None)
            .into_transaction(1, Uuid::new_v4());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "DEPOSIT");
    }
}
