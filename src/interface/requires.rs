use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::classify;
use crate::constants::EXTRA_USER_ROLES_KEY;
use crate::AliasAllocator;
use crate::DiffEngine;
use crate::Error;
use crate::EventDescriptor;
use crate::EventKind;
use crate::EventRouter;
use crate::PeerTrigger;
use crate::Protocol;
use crate::RelationBackend;
use crate::RelationConfig;
use crate::RelationHandler;
use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::SnapshotStore;

/// Consumer side of a relation.
///
/// Publishes what it asks for (domain fields, extra roles) when a provider
/// joins, and turns the provider's published data into typed events.
#[derive(Debug)]
pub struct RequirerManager {
    config: RelationConfig,
    store: SnapshotStore,
    diff_engine: DiffEngine,
    aliases: AliasAllocator,
    router: EventRouter,
}

impl RequirerManager {
    /// Validates the configuration against the runtime and precomputes the
    /// event table. A misconfigured alias pool never gets past this point.
    pub fn new(
        config: RelationConfig,
        backend: Arc<dyn RelationBackend>,
    ) -> Result<Self> {
        config.validate()?;

        let relation_limit = backend.relation_limit(&config.relation_name);
        let store = SnapshotStore::new(config.relation_name.clone(), backend);
        let aliases = AliasAllocator::new(store.clone(), config.relation_aliases.clone(), relation_limit)?;

        let base_names: Vec<&'static str> = config.protocol.schema().event_names().collect();
        let router = EventRouter::new(
            base_names
                .iter()
                .map(|name| name.to_string())
                .chain(aliases.qualified_event_names(&base_names)),
        );

        debug!(
            relation = %config.relation_name,
            protocol = config.protocol.as_str(),
            "requirer manager ready: {:?}",
            router
        );

        Ok(Self {
            config,
            diff_engine: DiffEngine::new(store.clone()),
            store,
            aliases,
            router,
        })
    }

    pub fn relation_name(&self) -> &str {
        &self.config.relation_name
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

    /// Register a listener by event name, e.g. `database_created` or
    /// `cluster1_database_created`.
    pub fn subscribe<F>(
        &mut self,
        event_name: &str,
        listener: F,
    ) -> Result<()>
    where
        F: Fn(&EventDescriptor) + Send + Sync + 'static,
    {
        self.router.subscribe(event_name, Box::new(listener))
    }

    pub fn alias_of(
        &self,
        relation_id: RelationId,
    ) -> Result<Option<String>> {
        self.aliases.resolve(relation_id)
    }

    /// Remote data of every relation instance, for use outside event handlers
    pub fn fetch_all(&self) -> Result<BTreeMap<RelationId, Snapshot>> {
        self.store.fetch_all()
    }

    /// Fields the consumer publishes to ask for its domain
    fn requested_fields(&self) -> Snapshot {
        let schema = self.config.protocol.schema();
        let mut fields: Snapshot = schema
            .domain_keys
            .iter()
            .zip(&self.config.domain_fields)
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();

        if let Some(roles) = self.config.extra_user_roles.as_ref().filter(|r| !r.is_empty()) {
            fields.insert(EXTRA_USER_ROLES_KEY.to_string(), roles.clone());
        }
        fields
    }
}

impl RelationHandler for RequirerManager {
    fn on_peer_joined(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<()> {
        self.aliases.assign(trigger.relation_id)?;
        self.store.write(trigger.relation_id, &self.requested_fields())
    }

    fn on_peer_changed(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<Option<EventKind>> {
        let relation_id = trigger.relation_id;
        let schema = self.config.protocol.schema();

        // Claim the alias before the baseline advances: a failed claim must
        // leave the change to be reported on the next trigger
        let alias = self.aliases.assign(relation_id)?;
        let remote_app = self.store.remote_app(relation_id)?;

        let (diff, snapshot) = self.diff_engine.observe(relation_id)?;
        let Some(kind) = classify(&diff, &schema.rules) else {
            debug!(relation_id, "no event for diff");
            return Ok(None);
        };

        let name = schema.event_name(kind).ok_or_else(|| {
            Error::Fatal(format!("{} adapter has no event for {}", schema.name, kind))
        })?;

        let event = EventDescriptor {
            name,
            kind,
            relation_id,
            relation_name: self.config.relation_name.clone(),
            alias,
            remote_app,
            remote_unit: trigger.remote_unit.clone(),
            snapshot,
        };

        info!(relation_id, alias = ?event.alias, "{} fired", name);
        self.router.publish(&event);
        Ok(Some(kind))
    }
}
