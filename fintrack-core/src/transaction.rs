//! Transaction record types for one uploaded statement batch

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::dictionary::{UNCATEGORIZED, normalize_keyword};

/// A single statement row, annotated with the category it was assigned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Row index within its upload; identifies the row for corrections
    pub id: usize,
    pub date: NaiveDate,
    /// Free-text description as it appears on the statement
    pub details: String,
    /// Non-negative magnitude; the sign lives in `direction`
    pub amount: Decimal,
    pub direction: Direction,
    pub category: String,
}

/// Whether money left (debit) or entered (credit) the account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "Debit")]
    Debit,
    #[serde(rename = "Credit")]
    Credit,
}

impl Direction {
    /// Parse a statement's `Debit/Credit` label (trimmed, ASCII case-insensitive)
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("debit") {
            Some(Direction::Debit)
        } else if label.eq_ignore_ascii_case("credit") {
            Some(Direction::Credit)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
        }
    }
}

impl Transaction {
    /// Create a new transaction in the fallback category
    pub fn new(
        id: usize,
        date: NaiveDate,
        details: impl Into<String>,
        amount: Decimal,
        direction: Direction,
    ) -> Self {
        Self {
            id,
            date,
            details: details.into(),
            amount,
            direction,
            category: UNCATEGORIZED.to_string(),
        }
    }

    /// Details in the form keywords are stored in
    pub fn normalized_details(&self) -> String {
        normalize_keyword(&self.details)
    }

    pub fn is_expense(&self) -> bool {
        self.direction == Direction::Debit
    }

    pub fn is_income(&self) -> bool {
        self.direction == Direction::Credit
    }

    pub fn is_uncategorized(&self) -> bool {
        self.category == UNCATEGORIZED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_transaction_creation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let txn = Transaction::new(0, date, "  Carrefour CITY ", dec!(84.50), Direction::Debit);
        assert_eq!(txn.category, UNCATEGORIZED);
        assert!(txn.is_uncategorized());
        assert!(txn.is_expense());
        assert!(!txn.is_income());
        assert_eq!(txn.normalized_details(), "carrefour city");
    }

    #[test]
    fn test_direction_labels() {
        assert_eq!(Direction::from_label("Debit"), Some(Direction::Debit));
        assert_eq!(Direction::from_label(" credit "), Some(Direction::Credit));
        assert_eq!(Direction::from_label("Refund"), None);
        assert_eq!(Direction::Credit.label(), "Credit");
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&Direction::Debit).unwrap();
        assert_eq!(json, "\"Debit\"");
    }
}
