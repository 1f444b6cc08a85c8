//! Learning from corrections: when a user moves a transaction to another
//! category, its details become a keyword of that category so identical
//! transactions are categorized automatically from then on.

use fintrack_core::{Error, Result, Transaction, UNCATEGORIZED, is_fallback};

use crate::category_store::{CategoryStore, DictionaryStorage};

/// What a correction did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorrectionOutcome {
    /// The transaction was already in the requested category
    Unchanged,
    /// Recategorized; `learned` is false when the keyword was already known
    /// or the details were blank
    Learned { learned: bool },
    /// Moved back to the fallback; the details keyword was dropped from
    /// `previous_owner`
    Unlearned { previous_owner: Option<String> },
}

impl CorrectionOutcome {
    /// Whether the correction wrote a changed dictionary
    pub fn persisted(&self) -> bool {
        matches!(
            self,
            Self::Learned { learned: true } | Self::Unlearned { previous_owner: Some(_) }
        )
    }
}

/// Apply one user correction to `txn` and feed it back into `store`.
///
/// Unknown target categories are rejected before `txn` is touched. Each
/// correction that changes the dictionary is persisted on its own.
pub fn apply_correction<S: DictionaryStorage>(
    txn: &mut Transaction,
    new_category: &str,
    store: &mut CategoryStore<S>,
) -> Result<CorrectionOutcome> {
    if txn.category == new_category || (is_fallback(new_category) && txn.is_uncategorized()) {
        return Ok(CorrectionOutcome::Unchanged);
    }

    if is_fallback(new_category) {
        let previous_owner = store.remove_keyword(&txn.details)?;
        txn.category = UNCATEGORIZED.to_string();
        return Ok(CorrectionOutcome::Unlearned { previous_owner });
    }

    if !store.dictionary().contains(new_category) {
        return Err(Error::UnknownCategory(new_category.to_string()));
    }

    // The transaction only moves once the dictionary change is on disk.
    let learned = store.add_keyword(new_category, &txn.details)?;
    txn.category = new_category.to_string();
    Ok(CorrectionOutcome::Learned { learned })
}
