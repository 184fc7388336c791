use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;
use tracing::trace;

use crate::EventDescriptor;
use crate::RelationError;
use crate::Result;
use crate::EVENTS_EMITTED;

pub type Listener = Box<dyn Fn(&EventDescriptor) + Send + Sync>;

/// Per-instance event bus.
///
/// The set of event names is closed at construction: the unqualified names
/// of the adapter plus every `<alias>_<name>` pair of the alias pool.
/// Nothing is registered globally, so independently built routers never
/// see each other's events.
#[derive(Default)]
pub struct EventRouter {
    declared: HashSet<String>,
    listeners: HashMap<String, Vec<Listener>>,
}

impl std::fmt::Debug for EventRouter {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("EventRouter")
            .field("declared", &self.declared)
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventRouter {
    pub fn new<I, S>(declared: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            declared: declared.into_iter().map(Into::into).collect(),
            listeners: HashMap::new(),
        }
    }

    pub fn is_declared(
        &self,
        event_name: &str,
    ) -> bool {
        self.declared.contains(event_name)
    }

    /// Register a listener for a declared event name.
    /// Listeners of the same name run in registration order.
    pub fn subscribe(
        &mut self,
        event_name: &str,
        listener: Listener,
    ) -> Result<()> {
        if !self.is_declared(event_name) {
            return Err(RelationError::UnknownEvent(event_name.to_string()).into());
        }
        self.listeners.entry(event_name.to_string()).or_default().push(listener);
        Ok(())
    }

    /// Deliver the unqualified event, then the alias-qualified one when the
    /// descriptor carries an alias. Names without listeners are skipped.
    ///
    /// Returns how many listeners ran.
    pub fn publish(
        &self,
        event: &EventDescriptor,
    ) -> usize {
        let mut delivered = self.dispatch(event.name, event);

        if let Some(aliased) = event.aliased_name() {
            delivered += self.dispatch(&aliased, event);
        }

        delivered
    }

    fn dispatch(
        &self,
        event_name: &str,
        event: &EventDescriptor,
    ) -> usize {
        let Some(listeners) = self.listeners.get(event_name) else {
            trace!(event_name, "no listener registered");
            return 0;
        };

        for listener in listeners {
            listener(event);
        }

        EVENTS_EMITTED.with_label_values(&[event_name]).inc();
        debug!(
            event_name,
            relation_id = event.relation_id,
            listeners = listeners.len(),
            "event delivered"
        );
        listeners.len()
    }
}
