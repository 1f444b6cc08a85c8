//! One uploaded statement, classified and split into expenses and income.

use std::collections::HashSet;

use fintrack_core::{CategoryDictionary, Direction, Error, Result, Transaction};
use serde::Serialize;
use tracing::info;

use crate::aggregator::{CategoryTotal, Totals, aggregate, rollup};
use crate::category_store::{CategoryStore, DictionaryStorage};
use crate::classifier::{KeywordIndex, classify_batch};
use crate::learning::{CorrectionOutcome, apply_correction};

/// Everything the report surface shows for one batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub totals: Totals,
    pub expenses: Vec<CategoryTotal>,
    pub income: Vec<CategoryTotal>,
}

/// A categorized upload. Rebuilt for every upload, never merged with others.
#[derive(Debug, Clone, Default)]
pub struct CategorizedBatch {
    pub expenses: Vec<Transaction>,
    pub income: Vec<Transaction>,
}

impl CategorizedBatch {
    /// Classify `txns` against `dict` and partition them by direction
    pub fn classify(mut txns: Vec<Transaction>, dict: &CategoryDictionary) -> Self {
        classify_batch(&mut txns, dict);
        let (expenses, income): (Vec<_>, Vec<_>) = txns
            .into_iter()
            .partition(|t| t.direction == Direction::Debit);
        Self { expenses, income }
    }

    /// Re-derive every row's category from `dict`
    pub fn reclassify(&mut self, dict: &CategoryDictionary) {
        classify_batch(&mut self.expenses, dict);
        classify_batch(&mut self.income, dict);
    }

    pub fn len(&self) -> usize {
        self.expenses.len() + self.income.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty() && self.income.is_empty()
    }

    /// All rows, expenses first
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.expenses.iter().chain(self.income.iter())
    }

    pub fn get(&self, id: usize) -> Option<&Transaction> {
        self.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: usize) -> Option<&mut Transaction> {
        self.expenses
            .iter_mut()
            .chain(self.income.iter_mut())
            .find(|t| t.id == id)
    }

    /// Apply `(row id, category)` corrections in order, persisting what each
    /// one teaches. Rows that were not corrected are then re-classified so a
    /// learned keyword reaches identical rows in this batch too.
    ///
    /// Stops at the first failing correction; earlier ones stay applied and
    /// persisted.
    pub fn apply_corrections<S: DictionaryStorage>(
        &mut self,
        corrections: &[(usize, String)],
        store: &mut CategoryStore<S>,
    ) -> Result<Vec<CorrectionOutcome>> {
        let mut outcomes = Vec::with_capacity(corrections.len());
        let mut corrected = HashSet::new();

        for (id, category) in corrections {
            let txn = self.get_mut(*id).ok_or(Error::UnknownTransaction(*id))?;
            outcomes.push(apply_correction(txn, category, store)?);
            corrected.insert(*id);
        }

        let index = KeywordIndex::build(store.dictionary());
        for txn in self.expenses.iter_mut().chain(self.income.iter_mut()) {
            if !corrected.contains(&txn.id) {
                txn.category = index.classify(txn).to_string();
            }
        }

        info!(corrections = corrections.len(), "Applied corrections");
        Ok(outcomes)
    }

    pub fn totals(&self) -> Totals {
        rollup(self.iter())
    }

    pub fn summary(&self) -> Summary {
        Summary {
            totals: self.totals(),
            expenses: aggregate(&self.expenses),
            income: aggregate(&self.income),
        }
    }
}
