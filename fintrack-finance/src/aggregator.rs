//! Per-category totals and income/expense rollups

use std::collections::BTreeMap;

use fintrack_core::{Direction, Transaction};
use rust_decimal::Decimal;
use serde::Serialize;

/// One row of a category summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    /// Percentage of the summarized subset, rounded to 2 places
    pub share: Decimal,
    pub transaction_count: usize,
}

/// Directional totals over a whole batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub total_expense: Decimal,
    pub total_income: Decimal,
    pub net_balance: Decimal,
}

/// Sum amounts per category, largest total first (ties by name).
/// Only categories that occur in `txns` are listed.
pub fn aggregate(txns: &[Transaction]) -> Vec<CategoryTotal> {
    let mut groups: BTreeMap<&str, (Decimal, usize)> = BTreeMap::new();
    for txn in txns {
        let slot = groups.entry(txn.category.as_str()).or_default();
        slot.0 += txn.amount;
        slot.1 += 1;
    }

    let grand: Decimal = groups.values().map(|(total, _)| *total).sum();
    let hundred = Decimal::ONE_HUNDRED;

    let mut rows: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            share: total
                .checked_div(grand)
                .map(|ratio| (ratio * hundred).round_dp(2))
                .unwrap_or_default(),
            transaction_count: count,
        })
        .collect();

    // Stable sort keeps the name order from the BTreeMap for equal totals
    rows.sort_by(|a, b| b.total.cmp(&a.total));
    rows
}

/// Total expense, total income and net balance
pub fn rollup<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Totals {
    let mut totals = Totals::default();
    for txn in txns {
        match txn.direction {
            Direction::Debit => totals.total_expense += txn.amount,
            Direction::Credit => totals.total_income += txn.amount,
        }
    }
    totals.net_balance = totals.total_income - totals.total_expense;
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn txn(id: usize, category: &str, amount: Decimal, direction: Direction) -> Transaction {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut t = Transaction::new(id, date, format!("row {id}"), amount, direction);
        t.category = category.to_string();
        t
    }

    #[test]
    fn test_aggregate_sorted_descending() {
        let batch = vec![
            txn(0, "Dining", dec!(45.50), Direction::Debit),
            txn(1, "Rent", dec!(2500.00), Direction::Debit),
            txn(2, "Dining", dec!(120.25), Direction::Debit),
            txn(3, "Uncategorized", dec!(9.99), Direction::Debit),
        ];
        let rows = aggregate(&batch);
        let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Dining", "Uncategorized"]);
        assert_eq!(rows[1].total, dec!(165.75));
        assert_eq!(rows[1].transaction_count, 2);
    }

    #[test]
    fn test_aggregate_sum_matches_batch() {
        let batch = vec![
            txn(0, "Fuel", dec!(120.00), Direction::Debit),
            txn(1, "Dining", dec!(0.10), Direction::Debit),
            txn(2, "Dining", dec!(0.20), Direction::Debit),
            txn(3, "Utilities", dec!(455.10), Direction::Debit),
        ];
        let summed: Decimal = aggregate(&batch).iter().map(|r| r.total).sum();
        let expected: Decimal = batch.iter().map(|t| t.amount).sum();
        assert_eq!(summed, expected);
    }

    #[test]
    fn test_ties_ordered_by_name() {
        let batch = vec![
            txn(0, "Transport", dec!(50), Direction::Debit),
            txn(1, "Books", dec!(50), Direction::Debit),
        ];
        let names: Vec<_> = aggregate(&batch).into_iter().map(|r| r.category).collect();
        assert_eq!(names, vec!["Books", "Transport"]);
    }

    #[test]
    fn test_share_of_total() {
        let batch = vec![
            txn(0, "Rent", dec!(75), Direction::Debit),
            txn(1, "Dining", dec!(25), Direction::Debit),
        ];
        let rows = aggregate(&batch);
        assert_eq!(rows[0].share, dec!(75.00));
        assert_eq!(rows[1].share, dec!(25.00));

        let zero = aggregate(&[txn(0, "Fees", dec!(0), Direction::Debit)]);
        assert_eq!(zero[0].share, Decimal::ZERO);
    }

    #[test]
    fn test_empty_batch() {
        assert!(aggregate(&[]).is_empty());
        assert_eq!(rollup(&[] as &[Transaction]), Totals::default());
    }

    #[test]
    fn test_rollup_net_balance() {
        let batch = vec![
            txn(0, "Rent", dec!(2500.00), Direction::Debit),
            txn(1, "Dining", dec!(84.50), Direction::Debit),
            txn(2, "Salary", dec!(12500.00), Direction::Credit),
        ];
        let totals = rollup(&batch);
        assert_eq!(totals.total_expense, dec!(2584.50));
        assert_eq!(totals.total_income, dec!(12500.00));
        assert_eq!(totals.net_balance, dec!(9915.50));
        assert_eq!(totals.total_income - totals.total_expense, totals.net_balance);
    }
}
