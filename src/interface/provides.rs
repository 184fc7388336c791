use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::trace;

use crate::classify_request;
use crate::constants::*;
use crate::DiffEngine;
use crate::EventDescriptor;
use crate::EventKind;
use crate::EventRouter;
use crate::PeerTrigger;
use crate::Protocol;
use crate::ProviderConfig;
use crate::RelationBackend;
use crate::RelationError;
use crate::RelationHandler;
use crate::RelationId;
use crate::Result;
use crate::Snapshot;
use crate::SnapshotStore;

/// Provider side of a relation.
///
/// Fires `<domain>_requested` when a consumer publishes what it wants and
/// offers leader-gated setters for everything the provider answers with.
#[derive(Debug)]
pub struct ProviderManager {
    config: ProviderConfig,
    store: SnapshotStore,
    diff_engine: DiffEngine,
    router: EventRouter,
}

impl ProviderManager {
    pub fn new(
        config: ProviderConfig,
        backend: Arc<dyn RelationBackend>,
    ) -> Result<Self> {
        config.validate()?;

        let store = SnapshotStore::new(config.relation_name.clone(), backend);
        let router = EventRouter::new([config.protocol.schema().requested_event]);

        Ok(Self {
            config,
            diff_engine: DiffEngine::new(store.clone()),
            store,
            router,
        })
    }

    pub fn relation_name(&self) -> &str {
        &self.config.relation_name
    }

    pub fn protocol(&self) -> Protocol {
        self.config.protocol
    }

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

    /// Consumer data of every relation instance, for use outside event handlers
    pub fn fetch_all(&self) -> Result<BTreeMap<RelationId, Snapshot>> {
        self.store.fetch_all()
    }

    /// What the local application currently publishes on a relation
    pub fn published(
        &self,
        relation_id: RelationId,
    ) -> Result<Snapshot> {
        self.store.read_published(relation_id)
    }

    /// Publish several schema fields at once.
    ///
    /// Every key must belong to the adapter's provider schema; nothing is
    /// written otherwise. Non-leaders write nothing.
    pub fn update(
        &self,
        relation_id: RelationId,
        fields: &Snapshot,
    ) -> Result<()> {
        let schema = self.config.protocol.schema();
        if let Some(field) = fields
            .keys()
            .find(|key| !schema.is_reader_key(key))
        {
            debug!(relation_id, field = %field, "rejecting field outside {} schema", schema.name);
            return Err(RelationError::UnsupportedField {
                protocol: schema.name,
                field: field.clone(),
            }
            .into());
        }

        self.store.write(relation_id, fields)
    }

    pub fn set_credentials(
        &self,
        relation_id: RelationId,
        username: &str,
        password: &str,
    ) -> Result<()> {
        let mut fields = Snapshot::new();
        fields.insert(USERNAME_KEY.to_string(), username.to_string());
        fields.insert(PASSWORD_KEY.to_string(), password.to_string());
        self.update(relation_id, &fields)
    }

    /// Comma separated read/write endpoints
    pub fn set_endpoints(
        &self,
        relation_id: RelationId,
        endpoints: &str,
    ) -> Result<()> {
        self.set_field(relation_id, ENDPOINTS_KEY, endpoints)
    }

    pub fn set_read_only_endpoints(
        &self,
        relation_id: RelationId,
        endpoints: &str,
    ) -> Result<()> {
        self.set_field(relation_id, READ_ONLY_ENDPOINTS_KEY, endpoints)
    }

    pub fn set_replset(
        &self,
        relation_id: RelationId,
        replset: &str,
    ) -> Result<()> {
        self.set_field(relation_id, REPLSET_KEY, replset)
    }

    pub fn set_uris(
        &self,
        relation_id: RelationId,
        uris: &str,
    ) -> Result<()> {
        self.set_field(relation_id, URIS_KEY, uris)
    }

    pub fn set_version(
        &self,
        relation_id: RelationId,
        version: &str,
    ) -> Result<()> {
        self.set_field(relation_id, VERSION_KEY, version)
    }

    pub fn set_tls(
        &self,
        relation_id: RelationId,
        tls: &str,
    ) -> Result<()> {
        self.set_field(relation_id, TLS_KEY, tls)
    }

    pub fn set_tls_ca(
        &self,
        relation_id: RelationId,
        tls_ca: &str,
    ) -> Result<()> {
        self.set_field(relation_id, TLS_CA_KEY, tls_ca)
    }

    /// Broker uris, published under `endpoints`
    pub fn set_bootstrap_server(
        &self,
        relation_id: RelationId,
        bootstrap_server: &str,
    ) -> Result<()> {
        self.set_field(relation_id, ENDPOINTS_KEY, bootstrap_server)
    }

    pub fn set_consumer_group_prefix(
        &self,
        relation_id: RelationId,
        prefix: &str,
    ) -> Result<()> {
        self.set_field(relation_id, CONSUMER_GROUP_PREFIX_KEY, prefix)
    }

    pub fn set_zookeeper_uris(
        &self,
        relation_id: RelationId,
        uris: &str,
    ) -> Result<()> {
        self.set_field(relation_id, ZOOKEEPER_URIS_KEY, uris)
    }

    fn set_field(
        &self,
        relation_id: RelationId,
        key: &'static str,
        value: &str,
    ) -> Result<()> {
        let mut fields = Snapshot::new();
        fields.insert(key.to_string(), value.to_string());
        self.update(relation_id, &fields)
    }
}

impl RelationHandler for ProviderManager {
    fn on_peer_joined(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<()> {
        // Nothing to publish until the consumer asks for something
        trace!(relation_id = trigger.relation_id, "consumer joined");
        Ok(())
    }

    fn on_peer_changed(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<Option<EventKind>> {
        let relation_id = trigger.relation_id;
        let schema = self.config.protocol.schema();

        let (diff, snapshot) = self.diff_engine.observe(relation_id)?;
        let Some(kind) = classify_request(&diff, schema.domain_keys) else {
            debug!(relation_id, "no request in diff");
            return Ok(None);
        };

        let event = EventDescriptor {
            name: schema.requested_event,
            kind,
            relation_id,
            relation_name: self.config.relation_name.clone(),
            alias: None,
            remote_app: self.store.remote_app(relation_id)?,
            remote_unit: trigger.remote_unit.clone(),
            snapshot,
        };

        info!(relation_id, "{} fired", event.name);
        self.router.publish(&event);
        Ok(Some(kind))
    }
}
