//! Diff classification
//!
//! Rules run in a fixed priority order and at most one event fires per diff.
//! A single remote write that both grants credentials and exposes endpoints
//! must only fire `Created`: its handler is expected to read the current
//! endpoints itself.

use crate::Diff;
use crate::EventKind;

/// Field-to-rule mapping declared by an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierRules {
    /// Pair of keys whose joint appearance means access was granted
    pub credential_keys: [&'static str; 2],
    /// Primary endpoint key and the kind its change fires
    pub primary_endpoint: Option<(&'static str, EventKind)>,
    pub read_only_endpoint: Option<&'static str>,
    /// Whether a change of existing credentials fires `CredentialsChanged`
    pub credentials_rotation: bool,
}

/// Consumer side classification:
/// 1. both credential keys added -> `Created`
/// 2. primary endpoint added or changed -> adapter's endpoint kind
/// 3. read-only endpoint added or changed -> `ReadOnlyEndpointsChanged`
/// 4. a credential key changed -> `CredentialsChanged` (if supported)
pub fn classify(
    diff: &Diff,
    rules: &ClassifierRules,
) -> Option<EventKind> {
    let [user_key, secret_key] = rules.credential_keys;

    if diff.is_added(user_key) && diff.is_added(secret_key) {
        return Some(EventKind::Created);
    }

    if let Some((endpoint_key, kind)) = rules.primary_endpoint {
        if diff.is_added_or_changed(endpoint_key) {
            return Some(kind);
        }
    }

    if let Some(endpoint_key) = rules.read_only_endpoint {
        if diff.is_added_or_changed(endpoint_key) {
            return Some(EventKind::ReadOnlyEndpointsChanged);
        }
    }

    if rules.credentials_rotation && (diff.is_changed(user_key) || diff.is_changed(secret_key)) {
        return Some(EventKind::CredentialsChanged);
    }

    None
}

/// Provider side classification: the consumer published a domain key
pub fn classify_request(
    diff: &Diff,
    domain_keys: &[&str],
) -> Option<EventKind> {
    domain_keys
        .iter()
        .any(|key| diff.is_added(key))
        .then_some(EventKind::Requested)
}
