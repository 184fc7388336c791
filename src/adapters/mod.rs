//! Protocol adapters
//!
//! Each adapter is a declarative schema: which keys the consumer writes,
//! which keys the provider answers with, and which diff rules map to which
//! named event. Behaviour lives in the managers; adapters only describe.

mod coordination;
mod database;
mod message_broker;


pub use coordination::*;
pub use database::*;
pub use message_broker::*;
use serde::Deserialize;
use serde::Serialize;

use crate::ClassifierRules;
use crate::EventKind;

/// Protocol family spoken over a relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    /// Generic database (postgresql, mysql, mongodb, ...)
    #[default]
    Database,
    /// Message broker (kafka)
    MessageBroker,
    /// Coordination service (zookeeper)
    Coordination,
}

impl Protocol {
    pub fn schema(&self) -> &'static AdapterSchema {
        match self {
            Protocol::Database => &DATABASE_SCHEMA,
            Protocol::MessageBroker => &MESSAGE_BROKER_SCHEMA,
            Protocol::Coordination => &COORDINATION_SCHEMA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.schema().name
    }
}

/// Field schema plus event mapping of one protocol family
#[derive(Debug)]
pub struct AdapterSchema {
    pub name: &'static str,
    /// Keys carrying what the consumer asks for, filled from `domain_fields`
    pub domain_keys: &'static [&'static str],
    /// Every key the consumer side may publish
    pub writer_keys: &'static [&'static str],
    /// Every key the provider side may publish
    pub reader_keys: &'static [&'static str],
    pub rules: ClassifierRules,
    /// Consumer side event names
    pub events: &'static [(EventKind, &'static str)],
    /// Provider side event fired when a consumer asks for its domain
    pub requested_event: &'static str,
}

impl AdapterSchema {
    pub fn event_name(
        &self,
        kind: EventKind,
    ) -> Option<&'static str> {
        if kind == EventKind::Requested {
            return Some(self.requested_event);
        }
        self.events.iter().find(|(k, _)| *k == kind).map(|(_, name)| *name)
    }

    pub fn event_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.events.iter().map(|(_, name)| *name)
    }

    pub fn is_reader_key(
        &self,
        key: &str,
    ) -> bool {
        self.reader_keys.contains(&key)
    }
}
