//! Bank statement CSV parser.
//!
//! Expected header (column order free, surrounding whitespace ignored):
//!   Date,Details,Amount,Debit/Credit
//!   05 Jan 2025,CARREFOUR CITY,"1,084.50",Debit
//!
//! Any bad row aborts the whole file: a batch is either loaded completely or
//! not at all.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use fintrack_core::{Direction, Error, Result, Transaction};
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::types::{COL_AMOUNT, COL_DATE, COL_DETAILS, COL_DIRECTION, ImportOptions};

/// Digits with optional `,` grouping and an optional fractional part
const AMOUNT_PATTERN: &str = r"^\d[\d,]*(\.\d+)?$";

struct Columns {
    date: usize,
    details: usize,
    amount: usize,
    direction: usize,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::Input(format!("missing column {name:?}")))
        };
        Ok(Self {
            date: find(COL_DATE)?,
            details: find(COL_DETAILS)?,
            amount: find(COL_AMOUNT)?,
            direction: find(COL_DIRECTION)?,
        })
    }
}

/// Parse a statement CSV file into uncategorized transactions.
pub fn parse_statement_csv(path: impl AsRef<Path>, opts: &ImportOptions) -> Result<Vec<Transaction>> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| Error::Input(format!("opening {}: {e}", path.display())))?;
    parse_statement_reader(file, opts)
}

/// Parse statement CSV content from any reader.
pub fn parse_statement_reader<R: Read>(reader: R, opts: &ImportOptions) -> Result<Vec<Transaction>> {
    let amount_re = Regex::new(AMOUNT_PATTERN).map_err(|e| Error::Input(e.to_string()))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| Error::Input(format!("reading header: {e}")))?
        .clone();
    let cols = Columns::locate(&headers)?;

    let mut txns = Vec::new();
    for (id, result) in rdr.records().enumerate() {
        // 1-based, counting the header line
        let row = id + 2;
        let record = result.map_err(|e| Error::Input(format!("row {row}: {e}")))?;
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .map(str::trim)
                .ok_or_else(|| Error::Input(format!("row {row}: missing {name}")))
        };

        let date_str = field(cols.date, COL_DATE)?;
        let date = NaiveDate::parse_from_str(date_str, &opts.date_format).map_err(|e| {
            Error::Input(format!(
                "row {row}: bad date {date_str:?} (expected {}): {e}",
                opts.date_format
            ))
        })?;

        let amount_str = field(cols.amount, COL_AMOUNT)?;
        let amount = parse_amount(&amount_re, amount_str)
            .ok_or_else(|| Error::Input(format!("row {row}: bad amount {amount_str:?}")))?;

        let label = field(cols.direction, COL_DIRECTION)?;
        let direction = Direction::from_label(label)
            .ok_or_else(|| Error::Input(format!("row {row}: bad direction {label:?}")))?;

        let details = field(cols.details, COL_DETAILS)?;
        txns.push(Transaction::new(id, date, details, amount, direction));
    }

    debug!(rows = txns.len(), "Parsed statement");
    Ok(txns)
}

/// Strip grouping separators and parse a non-negative amount
fn parse_amount(re: &Regex, raw: &str) -> Option<Decimal> {
    if !re.is_match(raw) {
        return None;
    }
    raw.replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    fn parse(text: &str) -> Result<Vec<Transaction>> {
        parse_statement_reader(text.as_bytes(), &ImportOptions::default())
    }

    #[test]
    fn test_parse_basic_statement() {
        let text = "\
Date,Details,Amount,Debit/Credit
05 Jan 2025,CARREFOUR CITY,84.50,Debit
06 Jan 2025,SALARY TRANSFER,\"12,500.00\",Credit
";
        let txns = parse(text).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].id, 0);
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 1, 5).unwrap());
        assert_eq!(txns[0].details, "CARREFOUR CITY");
        assert_eq!(txns[0].amount, dec!(84.50));
        assert_eq!(txns[0].direction, Direction::Debit);
        assert!(txns[0].is_uncategorized());

        assert_eq!(txns[1].id, 1);
        assert_eq!(txns[1].amount, dec!(12500.00));
        assert_eq!(txns[1].direction, Direction::Credit);
    }

    #[test]
    fn test_headers_trimmed_and_extra_columns_ignored() {
        let text = "\
 Reference , Date ,Details , Amount,Debit/Credit ,Balance
R1,07 Feb 2025,  ENOC 1021 ,120,Debit,900.00
";
        let txns = parse(text).unwrap();
        assert_eq!(txns.len(), 1);
        assert_eq!(txns[0].details, "ENOC 1021");
        assert_eq!(txns[0].amount, dec!(120));
    }

    #[test]
    fn test_missing_column_is_input_error() {
        let err = parse("Date,Details,Amount\n05 Jan 2025,X,1.00\n").unwrap_err();
        assert!(matches!(err, Error::Input(msg) if msg.contains("Debit/Credit")));
    }

    #[test]
    fn test_bad_rows_abort_batch() {
        let bad_amount = "Date,Details,Amount,Debit/Credit\n05 Jan 2025,A,1.00,Debit\n06 Jan 2025,B,abc,Debit\n";
        assert!(matches!(parse(bad_amount), Err(Error::Input(msg)) if msg.contains("row 3")));

        let negative = "Date,Details,Amount,Debit/Credit\n05 Jan 2025,A,-1.00,Debit\n";
        assert!(matches!(parse(negative), Err(Error::Input(_))));

        let bad_date = "Date,Details,Amount,Debit/Credit\n2025-01-05,A,1.00,Debit\n";
        assert!(matches!(parse(bad_date), Err(Error::Input(msg)) if msg.contains("bad date")));

        let bad_direction = "Date,Details,Amount,Debit/Credit\n05 Jan 2025,A,1.00,Refund\n";
        assert!(matches!(parse(bad_direction), Err(Error::Input(msg)) if msg.contains("direction")));
    }

    #[test]
    fn test_custom_date_format() {
        let opts = ImportOptions {
            date_format: "%d/%m/%Y".to_string(),
        };
        let text = "Date,Details,Amount,Debit/Credit\n31/03/2025,DEWA,455.10,Debit\n";
        let txns = parse_statement_reader(text.as_bytes(), &opts).unwrap();
        assert_eq!(txns[0].date, NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
    }

    #[test]
    fn test_parse_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Details,Amount,Debit/Credit").unwrap();
        writeln!(file, "05 Jan 2025,NETFLIX.COM,39.00,Debit").unwrap();
        let txns = parse_statement_csv(file.path(), &ImportOptions::default()).unwrap();
        assert_eq!(txns.len(), 1);

        let missing = parse_statement_csv("/nonexistent/statement.csv", &ImportOptions::default());
        assert!(matches!(missing, Err(Error::Input(msg)) if msg.contains("opening")));
    }
}
