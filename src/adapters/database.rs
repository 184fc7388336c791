use crate::constants::*;
use crate::AdapterSchema;
use crate::ClassifierRules;
use crate::EventKind;
use crate::Snapshot;

pub(crate) static DATABASE_SCHEMA: AdapterSchema = AdapterSchema {
    name: "database",
    domain_keys: &[DATABASE_KEY],
    writer_keys: &[DATABASE_KEY, EXTRA_USER_ROLES_KEY],
    reader_keys: &[
        USERNAME_KEY,
        PASSWORD_KEY,
        ENDPOINTS_KEY,
        READ_ONLY_ENDPOINTS_KEY,
        REPLSET_KEY,
        URIS_KEY,
        VERSION_KEY,
        TLS_KEY,
        TLS_CA_KEY,
    ],
    rules: ClassifierRules {
        credential_keys: [USERNAME_KEY, PASSWORD_KEY],
        primary_endpoint: Some((ENDPOINTS_KEY, EventKind::EndpointsChanged)),
        read_only_endpoint: Some(READ_ONLY_ENDPOINTS_KEY),
        credentials_rotation: false,
    },
    events: &[
        (EventKind::Created, "database_created"),
        (EventKind::EndpointsChanged, "endpoints_changed"),
        (EventKind::ReadOnlyEndpointsChanged, "read_only_endpoints_changed"),
    ],
    requested_event: "database_requested",
};

/// Database fields of a relation snapshot
#[derive(Debug, Clone, Copy)]
pub struct DatabaseFields<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> DatabaseFields<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Requested database name (provider side)
    pub fn database(&self) -> Option<&'a str> {
        self.get(DATABASE_KEY)
    }

    /// Comma separated list of read/write endpoints
    pub fn endpoints(&self) -> Option<&'a str> {
        self.get(ENDPOINTS_KEY)
    }

    /// Comma separated list of read-only endpoints
    pub fn read_only_endpoints(&self) -> Option<&'a str> {
        self.get(READ_ONLY_ENDPOINTS_KEY)
    }

    /// Replica set name. MongoDB only.
    pub fn replset(&self) -> Option<&'a str> {
        self.get(REPLSET_KEY)
    }

    /// Connection URIs (MongoDB, Redis, OpenSearch)
    pub fn uris(&self) -> Option<&'a str> {
        self.get(URIS_KEY)
    }

    /// Version as reported by the database daemon
    pub fn version(&self) -> Option<&'a str> {
        self.get(VERSION_KEY)
    }

    fn get(
        &self,
        key: &str,
    ) -> Option<&'a str> {
        self.snapshot.get(key).map(String::as_str)
    }
}
