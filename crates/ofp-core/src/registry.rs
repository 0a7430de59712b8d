//! The process-wide network registry: datapath id → switch record (§3).

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::switch::SwitchRecord;

/// Process-wide mapping from datapath id to switch record.
///
/// At most one live record exists per datapath id; a reconnection from the
/// same dpid rebinds the existing record's stream rather than inserting a
/// duplicate (§3's invariant, exercised by [`Registry::get_or_insert_with`]).
///
/// The data model describes the key as "datapath id (string form)"; this
/// implementation keys on the typed `u64` directly; see `DESIGN.md` for why.
#[derive(Default)]
pub struct Registry {
    switches: RwLock<HashMap<u64, Arc<SwitchRecord>>>,
}

impl Registry {
    /// Build an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by datapath id. Concurrent readers do not block each other.
    pub async fn get(&self, dpid: u64) -> Option<Arc<SwitchRecord>> {
        self.switches.read().await.get(&dpid).cloned()
    }

    /// Fetch the existing record for `dpid`, or build and insert one with
    /// `make` if none exists yet. Returns the record and whether it was freshly inserted.
    ///
    /// The write lock is held for the whole lookup-or-insert so that two
    /// concurrent handshakes from the same dpid cannot both observe "absent"
    /// and insert two records.
    pub async fn get_or_insert_with<F>(&self, dpid: u64, make: F) -> (Arc<SwitchRecord>, bool)
    where
        F: FnOnce() -> Arc<SwitchRecord>,
    {
        let mut switches = self.switches.write().await;
        if let Some(existing) = switches.get(&dpid) {
            return (Arc::clone(existing), false);
        }
        let record = make();
        switches.insert(dpid, Arc::clone(&record));
        (record, true)
    }

    /// Remove a record entirely. Not used during ordinary disconnect handling
    /// (records are retained so a later reconnect reuses accumulated state);
    /// exposed for administrative teardown and tests.
    pub async fn remove(&self, dpid: u64) -> Option<Arc<SwitchRecord>> {
        self.switches.write().await.remove(&dpid)
    }

    /// Datapath ids of every currently registered switch.
    pub async fn dpids(&self) -> Vec<u64> {
        self.switches.read().await.keys().copied().collect()
    }

    /// Number of registered switches.
    pub async fn len(&self) -> usize {
        self.switches.read().await.len()
    }

    /// Whether the registry holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reconnection_rebinds_rather_than_duplicating() {
        let registry = Registry::new();
        let (first, inserted) = registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        assert!(inserted);

        let (second, inserted_again) =
            registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        assert!(!inserted_again);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn distinct_dpids_get_distinct_records() {
        let registry = Registry::new();
        registry.get_or_insert_with(1, || Arc::new(SwitchRecord::new(1, vec![]))).await;
        registry.get_or_insert_with(2, || Arc::new(SwitchRecord::new(2, vec![]))).await;
        assert_eq!(registry.len().await, 2);
        let mut dpids = registry.dpids().await;
        dpids.sort_unstable();
        assert_eq!(dpids, vec![1, 2]);
    }

    #[tokio::test]
    async fn unknown_dpid_is_absent() {
        let registry = Registry::new();
        assert!(registry.get(42).await.is_none());
    }
}
