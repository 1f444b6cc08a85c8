//! Error types shared by the FinTrack library crates

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Malformed upload: bad schema, unparseable amount/date/direction.
    /// Aborts the whole batch.
    #[error("Input error: {0}")]
    Input(String),

    /// Empty or reserved category name
    #[error("Invalid category: {0:?}")]
    InvalidCategory(String),

    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),

    /// Correction addressed to a row id that is not in the batch
    #[error("Unknown transaction: {0}")]
    UnknownTransaction(usize),

    /// Category dictionary could not be written
    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type Result<T> = std::result::Result<T, Error>;
