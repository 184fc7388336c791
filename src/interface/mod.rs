//! Relation managers
//!
//! Tie the core protocol together for one relation name:
//! trigger -> diff -> classify -> alias -> route.
//! The consumer side (`RequirerManager`) reacts to credentials and endpoints
//! published by a provider; the provider side (`ProviderManager`) reacts to
//! requests and publishes them.

mod provides;
mod requires;

pub use provides::*;
pub use requires::*;


use crate::EventKind;
use crate::RelationId;
use crate::Result;

/// "Peer data changed" notification delivered by the external runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerTrigger {
    pub relation_id: RelationId,
    /// Remote unit that triggered the change, when the runtime knows it
    pub remote_unit: Option<String>,
}

impl PeerTrigger {
    pub fn new(relation_id: RelationId) -> Self {
        Self {
            relation_id,
            remote_unit: None,
        }
    }

    pub fn from_unit(
        relation_id: RelationId,
        remote_unit: impl Into<String>,
    ) -> Self {
        Self {
            relation_id,
            remote_unit: Some(remote_unit.into()),
        }
    }
}

/// Shared interface of both relation sides.
///
/// Each call runs to completion before the runtime delivers the next
/// trigger; there is no suspension point inside a cycle.
pub trait RelationHandler {
    /// A remote application joined the relation
    fn on_peer_joined(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<()>;

    /// The remote mapping may have changed; returns the event kind that fired
    fn on_peer_changed(
        &self,
        trigger: &PeerTrigger,
    ) -> Result<Option<EventKind>>;
}
