//! Sled backed relation runtime.
//!
//! Persists the relation registry and every bag so that baselines and alias
//! assignments survive a restart of the local process. The leader flag is
//! not persisted: election is owned by the external runtime and pushed in
//! through [`SledRelationBackend::set_leader`].

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::constants::BAG_TREE_PREFIX;
use crate::constants::NEXT_RELATION_ID_KEY;
use crate::constants::RELATION_LIMIT_TREE;
use crate::constants::RELATION_REGISTRY_TREE;
use crate::Bag;
use crate::Error;
use crate::RelationBackend;
use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::StorageConfig;
use crate::StorageError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
struct RelationRecord {
    name: String,
    remote_app: String,
}

pub struct SledRelationBackend {
    db: sled::Db,
    registry: sled::Tree,
    limits: sled::Tree,
    leader: AtomicBool,
}

impl std::fmt::Debug for SledRelationBackend {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("SledRelationBackend")
            .field("relations", &self.registry.len())
            .finish()
    }
}

impl SledRelationBackend {
    pub fn open(config: &StorageConfig) -> Result<Self> {
        let path = config.db_root_dir.join("relations");
        debug!("open relation db from path: {:?}", &path);

        let db = sled::Config::default()
            .path(&path)
            .cache_capacity(config.cache_capacity)
            .flush_every_ms(config.flush_every_ms)
            .use_compression(true)
            .compression_factor(1)
            .open()
            .map_err(|e| {
                warn!("Try to open DB at this location: {:?} and failed: {:?}", path, e);
                Error::from(e)
            })?;

        Self::from_db(db)
    }

    pub fn from_db(db: sled::Db) -> Result<Self> {
        let registry = db.open_tree(RELATION_REGISTRY_TREE)?;
        let limits = db.open_tree(RELATION_LIMIT_TREE)?;
        Ok(Self {
            db,
            registry,
            limits,
            leader: AtomicBool::new(false),
        })
    }

    pub fn add_relation(
        &self,
        relation_name: &str,
        remote_app: &str,
    ) -> Result<RelationId> {
        let previous = self.db.fetch_and_update(NEXT_RELATION_ID_KEY, |old| {
            let next = old.map(decode_id).unwrap_or(0).saturating_add(1);
            Some(next.to_be_bytes().to_vec())
        })?;
        let relation_id = previous.as_deref().map(decode_id).unwrap_or(0);

        let record = RelationRecord {
            name: relation_name.to_string(),
            remote_app: remote_app.to_string(),
        };
        self.registry
            .insert(relation_id.to_be_bytes(), bincode::serialize(&record).map_err(StorageError::from)?)?;

        info!(relation_id, relation_name, remote_app, "relation added");
        Ok(relation_id)
    }

    /// Drop a relation instance together with all of its bags
    pub fn remove_relation(
        &self,
        relation_id: RelationId,
    ) -> Result<bool> {
        let removed = self.registry.remove(relation_id.to_be_bytes())?.is_some();
        for bag in [Bag::Remote, Bag::LocalApp, Bag::LocalUnit] {
            self.db.drop_tree(bag_tree_name(relation_id, bag))?;
        }
        debug!(relation_id, removed, "relation removed");
        Ok(removed)
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
    ) -> Result<()> {
        self.limits
            .insert(relation_name.as_bytes(), (limit as u64).to_be_bytes().to_vec())?;
        Ok(())
    }

    pub fn update_remote(
        &self,
        relation_id: RelationId,
        data: &Snapshot,
    ) -> Result<()> {
        self.update_bag(relation_id, Bag::Remote, data)
    }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn record(
        &self,
        relation_id: RelationId,
    ) -> Result<RelationRecord> {
        let raw = self
            .registry
            .get(relation_id.to_be_bytes())?
            .ok_or(StorageError::RelationNotFound { relation_id })?;
        Ok(bincode::deserialize(&raw).map_err(StorageError::from)?)
    }

    fn bag_tree(
        &self,
        relation_id: RelationId,
        bag: Bag,
    ) -> Result<sled::Tree> {
        // Touching the registry first keeps unknown ids from creating stray trees
        self.record(relation_id)?;
        Ok(self.db.open_tree(bag_tree_name(relation_id, bag))?)
    }
}

impl RelationBackend for SledRelationBackend {
    fn relation_ids(
        &self,
        relation_name: &str,
    ) -> Vec<RelationId> {
        let mut ids = Vec::new();
        for item in self.registry.iter() {
            let (key, value) = match item {
                Ok(kv) => kv,
                Err(e) => {
                    warn!("relation registry scan failed: {:?}", e);
                    continue;
                }
            };
            match bincode::deserialize::<RelationRecord>(&value) {
                Ok(record) if record.name == relation_name => ids.push(decode_id(&key)),
                Ok(_) => {}
                Err(e) => warn!("skipping undecodable relation record: {:?}", e),
            }
        }
        ids
    }

    fn remote_app(
        &self,
        relation_id: RelationId,
    ) -> Result<String> {
        Ok(self.record(relation_id)?.remote_app)
    }

    fn read_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
    ) -> Result<Snapshot> {
        let tree = self.bag_tree(relation_id, bag)?;
        let mut snapshot = Snapshot::new();
        for item in tree.iter() {
            let (key, value) = item?;
            snapshot.insert(decode_str(&key, relation_id)?, decode_str(&value, relation_id)?);
        }
        Ok(snapshot)
    }

    fn update_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
        data: &Snapshot,
    ) -> Result<()> {
        let tree = self.bag_tree(relation_id, bag)?;
        let mut batch = sled::Batch::default();
        for (key, value) in data {
            if value.is_empty() {
                batch.remove(key.as_bytes());
            } else {
                batch.insert(key.as_bytes(), value.as_bytes());
            }
        }
        tree.apply_batch(batch)?;
        Ok(())
    }

    fn is_leader(&self) -> bool {
        self.leader.load(Ordering::SeqCst)
    }

    fn relation_limit(
        &self,
        relation_name: &str,
    ) -> Option<usize> {
        match self.limits.get(relation_name.as_bytes()) {
            Ok(Some(raw)) => {
                let bytes: [u8; 8] = raw.as_ref().try_into().ok()?;
                Some(u64::from_be_bytes(bytes) as usize)
            }
            Ok(None) => None,
            Err(e) => {
                warn!(relation_name, "relation limit lookup failed: {:?}", e);
                None
            }
        }
    }
}

fn bag_tree_name(
    relation_id: RelationId,
    bag: Bag,
) -> String {
    format!("{BAG_TREE_PREFIX}_{relation_id}_{}", bag.as_str())
}

fn decode_id(raw: &[u8]) -> RelationId {
    let mut bytes = [0u8; 4];
    let len = raw.len().min(4);
    bytes[..len].copy_from_slice(&raw[..len]);
    RelationId::from_be_bytes(bytes)
}

fn decode_str(
    raw: &[u8],
    relation_id: RelationId,
) -> Result<String> {
    String::from_utf8(raw.to_vec()).map_err(|_| {
        StorageError::DataCorruption {
            location: format!("relation {relation_id} bag"),
        }
        .into()
    })
}
