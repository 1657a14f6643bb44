/// Canonical per-symbol record store
///
/// Holds the latest `CoinRecord` for every symbol the feed has mentioned
/// during the current session. Merging is whole-record replacement; symbols
/// are never removed, and iteration order is the insertion order of the
/// first sighting.
use indexmap::IndexMap;

use crate::types::CoinRecord;

#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: IndexMap<String, CoinRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one inbound batch, in delivery order
    ///
    /// Unseen symbols append at the end of the iteration order; seen symbols
    /// are replaced in place and keep their position. Callers that share the
    /// store across tasks must hold their write lock for the whole call so
    /// readers never observe a partially applied batch.
    pub fn merge(&mut self, batch: Vec<CoinRecord>) {
        for record in batch {
            // IndexMap::insert keeps the position of an existing key
            self.records.insert(record.symbol.clone(), record);
        }
    }

    /// Ordered snapshot for the render layer
    pub fn entries(&self) -> Vec<CoinRecord> {
        self.records.values().cloned().collect()
    }

    /// Latest record for one symbol, if the feed has mentioned it
    pub fn get(&self, symbol: &str) -> Option<&CoinRecord> {
        self.records.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
