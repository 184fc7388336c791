use peerdata::Bag;
use peerdata::MemoryRelationBackend;
use peerdata::RelationBackend;
use peerdata::RelationId;
use peerdata::Snapshot;

pub fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Replicate what `from` publishes on `from_id` into the remote bag `to`
/// sees on `to_id`, the way the orchestration runtime would.
pub fn replicate(
    from: &MemoryRelationBackend,
    from_id: RelationId,
    to: &MemoryRelationBackend,
    to_id: RelationId,
) {
    let published = from.read_bag(from_id, Bag::LocalApp).unwrap();
    let mut update = published.clone();
    for key in to.read_bag(to_id, Bag::Remote).unwrap().keys() {
        if !published.contains_key(key) {
            // Empty value deletes
            update.insert(key.clone(), String::new());
        }
    }
    to.update_remote(to_id, &update).unwrap();
}
