use crate::constants::*;
use crate::AdapterSchema;
use crate::ClassifierRules;
use crate::EventKind;
use crate::Snapshot;

pub(crate) static COORDINATION_SCHEMA: AdapterSchema = AdapterSchema {
    name: "coordination",
    domain_keys: &[CHROOT_KEY],
    writer_keys: &[CHROOT_KEY, EXTRA_USER_ROLES_KEY],
    reader_keys: &[USERNAME_KEY, PASSWORD_KEY, ENDPOINTS_KEY, TLS_KEY, TLS_CA_KEY],
    rules: ClassifierRules {
        credential_keys: [USERNAME_KEY, PASSWORD_KEY],
        primary_endpoint: Some((ENDPOINTS_KEY, EventKind::EndpointsChanged)),
        read_only_endpoint: None,
        credentials_rotation: true,
    },
    events: &[
        (EventKind::Created, "chroot_created"),
        (EventKind::EndpointsChanged, "endpoints_changed"),
        (EventKind::CredentialsChanged, "credentials_changed"),
    ],
    requested_event: "chroot_requested",
};

/// Coordination service fields of a relation snapshot
#[derive(Debug, Clone, Copy)]
pub struct CoordinationFields<'a> {
    snapshot: &'a Snapshot,
}

impl<'a> CoordinationFields<'a> {
    pub(crate) fn new(snapshot: &'a Snapshot) -> Self {
        Self { snapshot }
    }

    /// Requested root path (provider side)
    pub fn chroot(&self) -> Option<&'a str> {
        self.snapshot.get(CHROOT_KEY).map(String::as_str)
    }

    /// Comma separated list of read/write endpoints
    pub fn endpoints(&self) -> Option<&'a str> {
        self.snapshot.get(ENDPOINTS_KEY).map(String::as_str)
    }
}
