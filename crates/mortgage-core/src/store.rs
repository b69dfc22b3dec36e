//! Read path to persisted mortgage records.
//!
//! The engine never reads storage incrementally: an operation loads one
//! self-contained [`MortgageRecords`] value up front and computes against
//! that snapshot. Persistence technology lives behind the trait.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MortgageError;
use crate::types::{Mortgage, Payment, TermsSnapshot};
use crate::MortgageResult;

/// Everything the engine reads about one mortgage, captured at a single
/// point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageRecords {
    pub mortgage: Mortgage,
    #[serde(default)]
    pub terms: Vec<TermsSnapshot>,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

/// Snapshot read access to stored mortgages.
pub trait MortgageStore {
    /// Load all records for one mortgage, or `NotFound`.
    fn load(&self, mortgage_id: &str) -> MortgageResult<MortgageRecords>;
}

/// In-memory store keyed by mortgage id.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: HashMap<String, MortgageRecords>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<MortgageRecords>) -> Self {
        let mut store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Insert or replace a mortgage's records.
    pub fn insert(&mut self, records: MortgageRecords) {
        self.records.insert(records.mortgage.id.clone(), records);
    }

    /// Remove a mortgage together with its terms history and payments.
    /// Returns whether anything was removed; a purged id reads as `NotFound`.
    pub fn purge(&mut self, mortgage_id: &str) -> bool {
        self.records.remove(mortgage_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl MortgageStore for InMemoryStore {
    fn load(&self, mortgage_id: &str) -> MortgageResult<MortgageRecords> {
        debug!(mortgage_id, "loading mortgage records");
        self.records
            .get(mortgage_id)
            .cloned()
            .ok_or_else(|| MortgageError::NotFound {
                mortgage_id: mortgage_id.to_string(),
            })
    }
}
