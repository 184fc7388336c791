use std::collections::HashSet;

use config::ConfigError;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::aliased_event_name;
use crate::constants::ALIAS_KEY;
use crate::Error;
use crate::RelationError;
use crate::RelationId;
use crate::Result;
use crate::SnapshotStore;

/// Hands out aliases from a fixed pool, one per live relation instance.
///
/// Assignments are persisted in the local unit's private slot of the
/// relation itself, so they are recovered by reading, never re-derived.
#[derive(Debug, Clone)]
pub struct AliasAllocator {
    store: SnapshotStore,
    pool: Option<Vec<String>>,
}

impl AliasAllocator {
    /// Fails when a pool is configured and its size differs from the
    /// relation's declared concurrency limit.
    pub fn new(
        store: SnapshotStore,
        pool: Option<Vec<String>>,
        relation_limit: Option<usize>,
    ) -> Result<Self> {
        if let Some(aliases) = &pool {
            if relation_limit != Some(aliases.len()) {
                return Err(Error::Config(ConfigError::Message(format!(
                    "The number of aliases must match the maximum number of connections allowed in relation {}. Expected {:?}, got {}",
                    store.relation_name(),
                    relation_limit,
                    aliases.len()
                ))));
            }
        }

        Ok(Self { store, pool })
    }

    pub fn pool(&self) -> Option<&[String]> {
        self.pool.as_deref()
    }

    /// Claim the first free alias of the pool for `relation_id`.
    ///
    /// No-op without a pool; returns the existing alias when one is already
    /// assigned.
    pub fn assign(
        &self,
        relation_id: RelationId,
    ) -> Result<Option<String>> {
        let Some(pool) = &self.pool else {
            return Ok(None);
        };

        if let Some(existing) = self.store.read_private(relation_id, ALIAS_KEY)? {
            return Ok(Some(existing));
        }

        let mut claimed = HashSet::new();
        for other in self.store.relation_ids() {
            if let Some(alias) = self.store.read_private(other, ALIAS_KEY)? {
                debug!("Alias {} was already assigned to relation {}", alias, other);
                claimed.insert(alias);
            }
        }

        let Some(alias) = pool.iter().find(|alias| !claimed.contains(*alias)) else {
            warn!(
                relation_id,
                relation = %self.store.relation_name(),
                "alias pool exhausted: {:?}",
                pool
            );
            return Err(RelationError::AliasPoolExhausted {
                relation_name: self.store.relation_name().to_string(),
                relation_id,
            }
            .into());
        };

        self.store.write_private(relation_id, ALIAS_KEY, alias)?;
        info!(relation_id, alias = %alias, "relation alias assigned");
        Ok(Some(alias.clone()))
    }

    /// Persisted alias of a live relation instance. Never allocates.
    pub fn resolve(
        &self,
        relation_id: RelationId,
    ) -> Result<Option<String>> {
        if self.pool.is_none() || !self.store.relation_ids().contains(&relation_id) {
            return Ok(None);
        }
        self.store.read_private(relation_id, ALIAS_KEY)
    }

    /// Every `<alias>_<event>` name this pool can produce for `event_names`
    pub fn qualified_event_names<'a>(
        &'a self,
        event_names: &'a [&'static str],
    ) -> impl Iterator<Item = String> + 'a {
        self.pool
            .iter()
            .flatten()
            .flat_map(move |alias| event_names.iter().map(move |name| aliased_event_name(alias, name)))
    }
}
