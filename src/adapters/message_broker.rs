use crate::constants::*;
use crate::AdapterSchema;
use crate::ClassifierRules;
use crate::EventKind;
use crate::Snapshot;

pub(crate) static MESSAGE_BROKER_SCHEMA: AdapterSchema = AdapterSchema {
    name: "message-broker",
    domain_keys: &[TOPIC_KEY],
    writer_keys: &[TOPIC_KEY, EXTRA_USER_ROLES_KEY],
    reader_keys: &[
        USERNAME_KEY,
        PASSWORD_KEY,
        ENDPOINTS_KEY,
        ZOOKEEPER_URIS_KEY,
        CONSUMER_GROUP_PREFIX_KEY,
        TLS_KEY,
        TLS_CA_KEY,
    ],
    rules: ClassifierRules {
        credential_keys: [USERNAME_KEY, PASSWORD_KEY],
        primary_endpoint: Some((ENDPOINTS_KEY, EventKind::BootstrapServerChanged)),
        read_only_endpoint: None,
        credentials_rotation: true,
    },
    events: &[
        (EventKind::Created, "topic_created"),
        (EventKind::BootstrapServerChanged, "bootstrap_server_changed"),
        (EventKind::CredentialsChanged, "credentials_changed"),
    ],
    requested_event: "topic_requested",
};

/// Message broker fields of a relation snapshot
#[derive(Debug, Clone, Copy)]
pub struct BrokerFields<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> BrokerFields<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Requested topic (provider side)
    pub fn topic(&self) -> Option<&'a str> {
        self.get(TOPIC_KEY)
    }

    /// Comma separated list of broker uris, published under `endpoints`
    pub fn bootstrap_server(&self) -> Option<&'a str> {
        self.get(ENDPOINTS_KEY)
    }

    pub fn consumer_group_prefix(&self) -> Option<&'a str> {
        self.get(CONSUMER_GROUP_PREFIX_KEY)
    }

    /// Comma separated list of coordination service uris
    pub fn zookeeper_uris(&self) -> Option<&'a str> {
        self.get(ZOOKEEPER_URIS_KEY)
    }

    fn get(
        &self,
        key: &str,
    ) -> Option<&'a str> {
        self.snapshot.get(key).map(String::as_str)
    }
}
