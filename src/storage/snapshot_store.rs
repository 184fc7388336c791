use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::constants::DATA_KEY;
use crate::Bag;
use crate::RelationBackend;
use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::StorageError;
use crate::BASELINE_RESETS;
use crate::SKIPPED_WRITES;

/// Protocol view over a [`RelationBackend`].
///
/// Hides the reserved `data` key from every remote read, keeps the
/// last-seen snapshot in the local unit's private slot, and drops writes
/// to the published mapping unless the local unit is the writer-of-record.
#[derive(Clone)]
pub struct SnapshotStore {
    relation_name: String,
    backend: Arc<dyn RelationBackend>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").field("relation_name", &self.relation_name).finish()
    }
}

impl SnapshotStore {
    pub fn new(
        relation_name: impl Into<String>,
        backend: Arc<dyn RelationBackend>,
    ) -> Self {
        Self {
            relation_name: relation_name.into(),
            backend,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn relation_ids(&self) -> Vec<RelationId> {
        self.backend.relation_ids(&self.relation_name)
    }

    pub fn remote_app(
        &self,
        relation_id: RelationId,
    ) -> Result<String> {
        self.backend.remote_app(relation_id)
    }

    pub fn is_writer(&self) -> bool {
        self.backend.is_leader()
    }

    /// Current mapping published by the remote application, without bookkeeping keys
    pub fn read(
        &self,
        relation_id: RelationId,
    ) -> Result<Snapshot> {
        let mut snapshot = self.backend.read_bag(relation_id, Bag::Remote)?;
        snapshot.remove(DATA_KEY);
        trace!(relation_id, ?snapshot, "read remote snapshot");
        Ok(snapshot)
    }

    /// Last snapshot the diff engine reported on.
    ///
    /// Missing slot reads as empty. An unparseable slot is also read as empty
    /// so every current field is detected again as added.
    pub fn read_baseline(
        &self,
        relation_id: RelationId,
    ) -> Result<Snapshot> {
        let private = self.backend.read_bag(relation_id, Bag::LocalUnit)?;
        let Some(raw) = private.get(DATA_KEY) else {
            return Ok(Snapshot::new());
        };

        match serde_json::from_str::<Snapshot>(raw) {
            Ok(baseline) => Ok(baseline),
            Err(e) => {
                warn!(
                    relation_id,
                    relation = %self.relation_name,
                    "baseline is not a valid snapshot, starting from empty: {:?}",
                    e
                );
                BASELINE_RESETS.with_label_values(&[&self.relation_name]).inc();
                Ok(Snapshot::new())
            }
        }
    }

    pub fn write_baseline(
        &self,
        relation_id: RelationId,
        baseline: &Snapshot,
    ) -> Result<()> {
        let encoded = serde_json::to_string(baseline).map_err(StorageError::BaselineEncode)?;
        let mut update = Snapshot::new();
        update.insert(DATA_KEY.to_string(), encoded);
        self.backend.update_bag(relation_id, Bag::LocalUnit, &update)
    }

    /// Merge `partial` into the local application's published mapping.
    ///
    /// Silently ignored when the local unit is not the writer-of-record;
    /// callers needing other behavior check [`SnapshotStore::is_writer`] first.
    pub fn write(
        &self,
        relation_id: RelationId,
        partial: &Snapshot,
    ) -> Result<()> {
        if !self.backend.is_leader() {
            debug!(
                relation_id,
                relation = %self.relation_name,
                "not writer-of-record, skipping write of {:?}",
                partial.keys().collect::<Vec<_>>()
            );
            SKIPPED_WRITES.with_label_values(&[&self.relation_name]).inc();
            return Ok(());
        }

        self.backend.update_bag(relation_id, Bag::LocalApp, partial)
    }

    /// Mapping the local application currently publishes
    pub fn read_published(
        &self,
        relation_id: RelationId,
    ) -> Result<Snapshot> {
        let mut snapshot = self.backend.read_bag(relation_id, Bag::LocalApp)?;
        snapshot.remove(DATA_KEY);
        Ok(snapshot)
    }

    pub fn read_private(
        &self,
        relation_id: RelationId,
        key: &str,
    ) -> Result<Option<String>> {
        let private = self.backend.read_bag(relation_id, Bag::LocalUnit)?;
        Ok(private.get(key).filter(|v| !v.is_empty()).cloned())
    }

    pub fn write_private(
        &self,
        relation_id: RelationId,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let mut update = Snapshot::new();
        update.insert(key.to_string(), value.to_string());
        self.backend.update_bag(relation_id, Bag::LocalUnit, &update)
    }

    /// Remote mappings of every live relation instance, keyed by relation id.
    ///
    /// Meant for callers outside of event handlers.
    pub fn fetch_all(&self) -> Result<BTreeMap<RelationId, Snapshot>> {
        let mut all = BTreeMap::new();
        for relation_id in self.relation_ids() {
            all.insert(relation_id, self.read(relation_id)?);
        }
        Ok(all)
    }
}
