//! Helpers shared by unit tests

use std::sync::Arc;

use parking_lot::Mutex;

use crate::EventDescriptor;
use crate::MemoryRelationBackend;
use crate::RelationId;
use crate::Snapshot;

pub(crate) fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Backend with the local unit as leader and `count` relations named
/// `relation_name`, joined by `app-0`, `app-1`, ...
pub(crate) fn leader_backend(
    relation_name: &str,
    count: usize,
) -> (Arc<MemoryRelationBackend>, Vec<RelationId>) {
    let backend = Arc::new(MemoryRelationBackend::new());
    backend.set_leader(true);
    let ids = (0..count)
        .map(|i| backend.add_relation(relation_name, &format!("app-{i}")))
        .collect();
    (backend, ids)
}

/// Records every event handed to its listeners, in delivery order
#[derive(Clone, Default)]
pub(crate) struct EventRecorder {
    events: Arc<Mutex<Vec<(String, EventDescriptor)>>>,
}

impl EventRecorder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Listener tagging each recorded event with `tag`
    pub(crate) fn listener(
        &self,
        tag: &str,
    ) -> impl Fn(&EventDescriptor) + Send + Sync + 'static {
        let events = self.events.clone();
        let tag = tag.to_string();
        move |event: &EventDescriptor| events.lock().push((tag.clone(), event.clone()))
    }

    pub(crate) fn tags(&self) -> Vec<String> {
        self.events.lock().iter().map(|(tag, _)| tag.clone()).collect()
    }

    pub(crate) fn events(&self) -> Vec<EventDescriptor> {
        self.events.lock().iter().map(|(_, event)| event.clone()).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.events.lock().len()
    }
}
