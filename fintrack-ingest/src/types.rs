/// Header names the statement export must carry (other columns are ignored)
pub const COL_DATE: &str = "Date";
pub const COL_DETAILS: &str = "Details";
pub const COL_AMOUNT: &str = "Amount";
pub const COL_DIRECTION: &str = "Debit/Credit";

/// Default statement date format, e.g. `05 Jan 2025`
pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y";

/// Knobs for reading a statement export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    /// chrono format string for the `Date` column
    pub date_format: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_import_options() {
        assert_eq!(ImportOptions::default().date_format, DEFAULT_DATE_FORMAT);
    }
}
