use std::fmt;

use crate::constants::*;
use crate::BrokerFields;
use crate::CoordinationFields;
use crate::DatabaseFields;
use crate::RelationId;
use crate::Snapshot;

/// Closed set of outcomes a diff can be classified into.
///
/// Adapters map a subset of kinds to their own event names
/// (`Created` is `database_created`, `topic_created` or `chroot_created`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Credentials were granted for the first time
    Created,
    /// Primary read/write endpoints were added or changed
    EndpointsChanged,
    /// Broker uris were added or changed (message broker's primary endpoint)
    BootstrapServerChanged,
    /// Read-only endpoints were added or changed
    ReadOnlyEndpointsChanged,
    /// Existing credentials were rotated
    CredentialsChanged,
    /// Provider side: the consumer asked for its domain
    Requested,
}

impl fmt::Display for EventKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            EventKind::Created => "created",
            EventKind::EndpointsChanged => "endpoints_changed",
            EventKind::BootstrapServerChanged => "bootstrap_server_changed",
            EventKind::ReadOnlyEndpointsChanged => "read_only_endpoints_changed",
            EventKind::CredentialsChanged => "credentials_changed",
            EventKind::Requested => "requested",
        };
        f.write_str(name)
    }
}

/// Classified outcome handed to listeners.
///
/// Carries the identity of the remote party plus the snapshot that was
/// current when the event was classified; typed accessors read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDescriptor {
    /// Unqualified event name, e.g. `database_created`
    pub name: &'static str,
    pub kind: EventKind,
    pub relation_id: RelationId,
    pub relation_name: String,
    pub alias: Option<String>,
    pub remote_app: String,
    pub remote_unit: Option<String>,
    pub snapshot: Snapshot,
}

impl EventDescriptor {
    /// Alias-qualified event name, if the relation instance has an alias
    pub fn aliased_name(&self) -> Option<String> {
        self.alias.as_ref().map(|alias| aliased_event_name(alias, self.name))
    }

    pub fn username(&self) -> Option<&str> {
        self.get(USERNAME_KEY)
    }

    pub fn password(&self) -> Option<&str> {
        self.get(PASSWORD_KEY)
    }

    pub fn tls(&self) -> Option<&str> {
        self.get(TLS_KEY)
    }

    pub fn tls_ca(&self) -> Option<&str> {
        self.get(TLS_CA_KEY)
    }

    pub fn extra_user_roles(&self) -> Option<&str> {
        self.get(EXTRA_USER_ROLES_KEY)
    }

    pub fn database(&self) -> DatabaseFields<'_> {
        DatabaseFields::new(&self.snapshot)
    }

    pub fn broker(&self) -> BrokerFields<'_> {
        BrokerFields::new(&self.snapshot)
    }

    pub fn coordination(&self) -> CoordinationFields<'_> {
        CoordinationFields::new(&self.snapshot)
    }

    fn get(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.snapshot.get(key).map(String::as_str)
    }
}

pub fn aliased_event_name(
    alias: &str,
    event_name: &str,
) -> String {
    format!("{alias}_{event_name}")
}
