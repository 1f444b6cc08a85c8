//! fintrack-ingest: statement CSV ingestion into typed transactions.

pub mod parsers;
pub mod types;

pub use parsers::statement_csv::{parse_statement_csv, parse_statement_reader};
pub use types::ImportOptions;
