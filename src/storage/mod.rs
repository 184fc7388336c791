//! Storage
//!
//! Access to the per-relation key/value bags owned by the external runtime:
//! - `RelationBackend` is the seam to whatever replicates the bags between peers
//! - `SnapshotStore` layers the protocol rules on top (reserved keys, baseline
//!   slot, writer-of-record gate)

mod adaptors;
mod snapshot_store;


use std::collections::BTreeMap;

pub use adaptors::*;
#[cfg(test)]
use mockall::automock;
pub use snapshot_store::*;

use crate::Result;

/// Stable numeric identity of one relation instance
pub type RelationId = u32;

/// Full key/value mapping published by one side of a relation.
///
/// Ordered so that encoded baselines and diffs are deterministic.
pub type Snapshot = BTreeMap<String, String>;

/// Which half of a relation's data a read or write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bag {
    /// Mapping published by the remote application
    Remote,
    /// Mapping published by the local application (writer-of-record only)
    LocalApp,
    /// Private slot of the local unit (baseline and alias bookkeeping)
    LocalUnit,
}

impl Bag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bag::Remote => "remote",
            Bag::LocalApp => "local-app",
            Bag::LocalUnit => "local-unit",
        }
    }
}

/// Interface to the orchestration runtime that owns relation lifecycle,
/// leader election and data replication.
#[cfg_attr(test, automock)]
pub trait RelationBackend: Send + Sync + 'static {
    /// Live relation instances registered under `relation_name`, in creation order
    fn relation_ids(
        &self,
        relation_name: &str,
    ) -> Vec<RelationId>;

    /// Name of the remote application of a relation instance
    fn remote_app(
        &self,
        relation_id: RelationId,
    ) -> Result<String>;

    fn read_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
    ) -> Result<Snapshot>;

    /// Merge `data` into a bag. An empty value removes the key.
    fn update_bag(
        &self,
        relation_id: RelationId,
        bag: Bag,
        data: &Snapshot,
    ) -> Result<()>;

    /// Whether the local unit is the elected writer-of-record
    fn is_leader(&self) -> bool;

    /// Declared maximum number of concurrent instances of a relation
    fn relation_limit(
        &self,
        relation_name: &str,
    ) -> Option<usize>;
}

/// Merge helper shared by the adaptors: empty values delete.
pub(crate) fn merge_into(
    target: &mut Snapshot,
    data: &Snapshot,
) {
    for (key, value) in data {
        if value.is_empty() {
            target.remove(key);
        } else {
            target.insert(key.clone(), value.clone());
        }
    }
}
