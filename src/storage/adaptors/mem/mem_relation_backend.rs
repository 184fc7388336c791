use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use parking_lot::RwLock;
use tracing::debug;
use tracing::info;

use crate::merge_into;
use crate::Bag;
use crate::RelationBackend;
use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::StorageError;

#[derive(Debug, Default)]
struct RelationState {
    name: String,
    remote_app: String,
    bags: HashMap<Bag, Snapshot>,
}

/// In-memory relation runtime.
///
/// Stands in for the orchestration runtime in tests and embedded setups:
/// relations are registered explicitly, the leader flag is flipped by hand
/// and the remote side publishes through [`MemoryRelationBackend::update_remote`].
#[derive(Debug, Default)]
pub struct MemoryRelationBackend {
    relations: RwLock<BTreeMap<RelationId, RelationState>>,
    limits: RwLock<HashMap<String, usize>>,
    next_id: AtomicU32,
    leader: AtomicBool,
}

impl MemoryRelationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new relation instance and return its id.
    /// Ids grow monotonically so iteration order is creation order.
    pub fn add_relation(
        &self,
        relation_name: &str,
        remote_app: &str,
    ) -> RelationId {
        let relation_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.relations.write().insert(
            relation_id,
            RelationState {
                name: relation_name.to_string(),
                remote_app: remote_app.to_string(),
                bags: HashMap::new(),
            },
        );
        info!(relation_id, relation_name, remote_app, "relation added");
        relation_id
    }

    pub fn remove_relation(
        &self,
        relation_id: RelationId,
    ) -> bool {
        let removed = self.relations.write().remove(&relation_id).is_some();
        debug!(relation_id, removed, "relation removed");
        removed
    }

    pub fn set_leader(
        &self,
        is_leader: bool,
    ) {
        self.leader.store(is_leader, Ordering::SeqCst);
    }

    pub fn set_relation_limit(
        &self,
        relation_name: &str,
        limit: usize,
    ) {
        self.limits.write().insert(relation_name.to_string(), limit);
    }

    /// Publish data as the remote application would
    pub fn update_remote(
        &self,
        relation_id: RelationId,
        data: &Snapshot,
    ) -> Result<()> {
        self.update_bag(relation_id, Bag::Remote, data)
    }
}

impl RelationBackend for MemoryRelationBackend {
    fn relation_ids(
        &self,
        relation_name: &str,
    ) -> Vec<RelationId> {
        self.relations
            .read()
            .iter()
            .filter(|(_, state)| state.name == relation_name)
            .map(|(id, _)| *id)
            .collect()
    }

    fn remote_app(
        &self,
        relation_id: RelationId,
    ) -> Result<String> {
        self.relations
            .read()
            .get(&relation_id)
            .map(|state| state.remote_app.clone())
            .ok_or_else(|| StorageError::RelationNotFound { relation_id }.into())
    }

    fn read_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
    ) -> Result<Snapshot> {
        let relations = self.relations.read();
        let state = relations
            .get(&relation_id)
            .ok_or(StorageError::RelationNotFound { relation_id })?;
        Ok(state.bags.get(&bag).cloned().unwrap_or_default())
    }

    fn update_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
        data: &Snapshot,
    ) -> Result<()> {
        let mut relations = self.relations.write();
        let state = relations
            .get_mut(&relation_id)
            .ok_or(StorageError::RelationNotFound { relation_id })?;
        merge_into(state.bags.entry(bag).or_default(), data);
        Ok(())
    }

    fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }

    fn relation_limit(
        &self,
        relation_name: &str,
    ) -> Option<usize> {
        self.limits.read().get(relation_name).copied()
    }
}
