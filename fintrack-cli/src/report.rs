//! Plain-text rendering of batches and summaries

use fintrack_core::Transaction;
use fintrack_finance::{CategoryTotal, Totals};
use rust_decimal::Decimal;

/// `1234567.5` -> `1,234,567.50`
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac_part}")
}

pub fn print_totals(totals: &Totals, currency: &str) {
    println!("Total Expenses: {} {}", format_amount(totals.total_expense), currency);
    println!("Total Income:   {} {}", format_amount(totals.total_income), currency);
    println!("Net Balance:    {} {}", format_amount(totals.net_balance), currency);
}

pub fn print_category_summary(title: &str, rows: &[CategoryTotal], currency: &str) {
    println!("\n## {title}\n");
    if rows.is_empty() {
        println!("(none)");
        return;
    }
    let width = rows.iter().map(|r| r.category.len()).max().unwrap_or(8).max(8);
    for r in rows {
        println!(
            "{:<width$}  {:>14} {}  {:>6}%  ({} txns)",
            r.category,
            format_amount(r.total),
            currency,
            r.share,
            r.transaction_count,
        );
    }
}

pub fn print_transactions<'a>(txns: impl IntoIterator<Item = &'a Transaction>, currency: &str) {
    for t in txns {
        println!(
            "{:>4}  {}  {:<40}  {:>14} {}  {:<6}  {}",
            t.id,
            t.date.format("%d/%m/%Y"),
            t.details,
            format_amount(t.amount),
            currency,
            t.direction.label(),
            t.category
        );
    }
}
