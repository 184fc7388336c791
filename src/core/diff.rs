use std::collections::BTreeSet;

use tracing::debug;

use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::SnapshotStore;
use crate::DIFF_RUNS;

/// Keys that moved between two snapshots.
///
/// The three sets are pairwise disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diff {
    /// Present now, absent before
    pub added: BTreeSet<String>,
    /// Present in both with a different value
    pub changed: BTreeSet<String>,
    /// Present before, absent now
    pub deleted: BTreeSet<String>,
}

impl Diff {
    pub fn between(
        prior: &Snapshot,
        current: &Snapshot,
    ) -> Self {
        let mut diff = Diff::default();

        for (key, value) in current {
            match prior.get(key) {
                None => {
                    diff.added.insert(key.clone());
                }
                Some(old) if old != value => {
                    diff.changed.insert(key.clone());
                }
                Some(_) => {}
            }
        }

        diff.deleted = prior
            .keys()
            .filter(|key| !current.contains_key(*key))
            .cloned()
            .collect();

        diff
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }

    pub fn is_added(
        &self,
        key: &str,
    ) -> bool {
        self.added.contains(key)
    }

    pub fn is_changed(
        &self,
        key: &str,
    ) -> bool {
        self.changed.contains(key)
    }

    pub fn is_added_or_changed(
        &self,
        key: &str,
    ) -> bool {
        self.is_added(key) || self.is_changed(key)
    }
}

/// Computes diffs against the stored baseline and advances it.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    store: SnapshotStore,
}

impl DiffEngine {
    pub fn new(store: SnapshotStore) -> Self {
        Self { store }
    }

    /// Diff the remote mapping against the last reported one.
    ///
    /// The current snapshot becomes the new baseline before returning, so a
    /// second call without remote changes yields an empty diff. A change
    /// whose diff is never consumed is not reported again.
    pub fn diff(
        &self,
        relation_id: RelationId,
    ) -> Result<Diff> {
        self.observe(relation_id).map(|(diff, _)| diff)
    }

    /// Same as [`DiffEngine::diff`], also handing back the snapshot the diff was taken against
    pub fn observe(
        &self,
        relation_id: RelationId,
    ) -> Result<(Diff, Snapshot)> {
        let current = self.store.read(relation_id)?;
        let prior = self.store.read_baseline(relation_id)?;

        let diff = Diff::between(&prior, &current);
        self.store.write_baseline(relation_id, &current)?;

        DIFF_RUNS.with_label_values(&[self.store.relation_name()]).inc();
        debug!(
            relation_id,
            added = ?diff.added,
            changed = ?diff.changed,
            deleted = ?diff.deleted,
            "relation diff"
        );

        Ok((diff, current))
    }
}
