//! fintrack-core: transaction and category dictionary types shared across FinTrack

pub mod dictionary;
pub mod error;
pub mod transaction;

pub use dictionary::{CategoryDictionary, UNCATEGORIZED, is_fallback, normalize_keyword};
pub use error::{Error, Result};
pub use transaction::{Direction, Transaction};
