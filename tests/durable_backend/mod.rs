use std::sync::Arc;

use peerdata::EventKind;
use peerdata::PeerDataConfig;
use peerdata::PeerTrigger;
use peerdata::Protocol;
use peerdata::RelationBackend;
use peerdata::RelationConfig;
use peerdata::RelationHandler;
use peerdata::RequirerManager;
use peerdata::SledRelationBackend;
use peerdata::StorageConfig;

use crate::common::snapshot;

fn storage_config(dir: &tempfile::TempDir) -> StorageConfig {
    StorageConfig {
        db_root_dir: dir.path().to_path_buf(),
        ..StorageConfig::default()
    }
}

fn requirer(backend: Arc<SledRelationBackend>) -> RequirerManager {
    RequirerManager::new(
        RelationConfig::new("database", Protocol::Database, vec!["orders".into()])
            .with_relation_aliases(["primary"]),
        backend,
    )
    .unwrap()
}

#[test]
fn baseline_and_alias_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let relation_id;

    {
        let backend = Arc::new(SledRelationBackend::open(&storage_config(&dir)).unwrap());
        backend.set_leader(true);
        backend.set_relation_limit("database", 1).unwrap();
        relation_id = backend.add_relation("database", "postgresql").unwrap();

        let manager = requirer(backend.clone());
        manager.on_peer_joined(&PeerTrigger::new(relation_id)).unwrap();
        backend
            .update_remote(relation_id, &snapshot(&[("username", "u"), ("password", "p")]))
            .unwrap();
        assert_eq!(
            manager.on_peer_changed(&PeerTrigger::new(relation_id)).unwrap(),
            Some(EventKind::Created)
        );
        backend.flush().unwrap();
    }

    let backend = Arc::new(SledRelationBackend::open(&storage_config(&dir)).unwrap());
    assert_eq!(backend.relation_ids("database"), vec![relation_id]);

    let manager = requirer(backend.clone());
    assert_eq!(manager.alias_of(relation_id).unwrap().as_deref(), Some("primary"));

    // Already reported before the restart
    assert_eq!(manager.on_peer_changed(&PeerTrigger::new(relation_id)).unwrap(), None);

    backend
        .update_remote(relation_id, &snapshot(&[("endpoints", "pg-0:5432")]))
        .unwrap();
    assert_eq!(
        manager.on_peer_changed(&PeerTrigger::new(relation_id)).unwrap(),
        Some(EventKind::EndpointsChanged)
    );
}

#[test]
fn config_drives_backend_location() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = PeerDataConfig::default();
    config.storage = storage_config(&dir);
    config.relation.domain_fields = vec!["orders".into()];
    let config = config.validate().unwrap();

    let backend = Arc::new(SledRelationBackend::open(&config.storage).unwrap());
    backend.set_leader(true);
    let relation_id = backend.add_relation(&config.relation.relation_name, "postgresql").unwrap();

    let manager = RequirerManager::new(config.relation.clone(), backend.clone()).unwrap();
    manager.on_peer_joined(&PeerTrigger::new(relation_id)).unwrap();

    assert!(dir.path().join("relations").exists());
    assert_eq!(
        manager.fetch_all().unwrap().keys().copied().collect::<Vec<_>>(),
        vec![relation_id]
    );
}
