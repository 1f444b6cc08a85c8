//! fintrack-finance: category store, keyword classifier, learning loop and aggregation

pub mod aggregator;
pub mod batch;
pub mod category_store;
pub mod classifier;
pub mod learning;

pub use aggregator::{CategoryTotal, Totals, aggregate, rollup};
pub use batch::{CategorizedBatch, Summary};
pub use category_store::{CategoryStore, DictionaryStorage, JsonFileStorage, MemoryStorage};
pub use classifier::{KeywordIndex, classify, classify_batch};
pub use learning::{CorrectionOutcome, apply_correction};
