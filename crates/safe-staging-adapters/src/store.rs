use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use safe_staging_core::{StagedProposal, StagingKey, StagingStorePort};

/// Process-lifetime store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStoreAdapter {
    entries: RwLock<HashMap<StagingKey, Vec<StagedProposal>>>,
}

impl MemoryStoreAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_count(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl StagingStorePort for MemoryStoreAdapter {
    fn get(&self, key: &StagingKey) -> Vec<StagedProposal> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    fn put(&self, key: StagingKey, proposals: Vec<StagedProposal>) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, proposals);
    }
}
