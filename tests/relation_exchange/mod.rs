use std::sync::Arc;

use parking_lot::Mutex;
use peerdata::Bag;
use peerdata::EventKind;
use peerdata::MemoryRelationBackend;
use peerdata::PeerTrigger;
use peerdata::Protocol;
use peerdata::ProviderConfig;
use peerdata::ProviderManager;
use peerdata::RelationBackend;
use peerdata::RelationConfig;
use peerdata::RelationHandler;
use peerdata::RequirerManager;

use crate::common::replicate;
use crate::common::snapshot;

/// Two applications, each with its own view of one relation
struct Deployment {
    client: Arc<MemoryRelationBackend>,
    client_id: u32,
    server: Arc<MemoryRelationBackend>,
    server_id: u32,
}

impl Deployment {
    fn new(relation_name: &str) -> Self {
        let client = Arc::new(MemoryRelationBackend::new());
        let server = Arc::new(MemoryRelationBackend::new());
        client.set_leader(true);
        server.set_leader(true);
        let client_id = client.add_relation(relation_name, "server-app");
        let server_id = server.add_relation(relation_name, "client-app");
        Self {
            client,
            client_id,
            server,
            server_id,
        }
    }

    fn client_to_server(&self) {
        replicate(&self.client, self.client_id, &self.server, self.server_id);
    }

    fn server_to_client(&self) {
        replicate(&self.server, self.server_id, &self.client, self.client_id);
    }
}

#[test]
fn database_handshake_end_to_end() {
    let deployment = Deployment::new("database");

    let mut requirer = RequirerManager::new(
        RelationConfig::new("database", Protocol::Database, vec!["orders".into()]).with_extra_user_roles("CREATEDB"),
        deployment.client.clone(),
    )
    .unwrap();
    let mut provider = ProviderManager::new(ProviderConfig::new("database", Protocol::Database), deployment.server.clone()).unwrap();

    let requested = Arc::new(Mutex::new(Vec::new()));
    let sink = requested.clone();
    provider
        .subscribe("database_requested", move |event| {
            sink.lock().push((
                event.database().database().map(str::to_string),
                event.extra_user_roles().map(str::to_string),
            ));
        })
        .unwrap();

    let client_events = Arc::new(Mutex::new(Vec::new()));
    for name in ["database_created", "endpoints_changed", "read_only_endpoints_changed"] {
        let sink = client_events.clone();
        requirer
            .subscribe(name, move |event| sink.lock().push((event.name, event.snapshot.clone())))
            .unwrap();
    }

    // Client joins and asks for a database
    requirer.on_peer_joined(&PeerTrigger::new(deployment.client_id)).unwrap();
    deployment.client_to_server();
    assert_eq!(
        provider.on_peer_changed(&PeerTrigger::from_unit(deployment.server_id, "client-app/0")).unwrap(),
        Some(EventKind::Requested)
    );
    assert_eq!(
        requested.lock().clone(),
        vec![(Some("orders".to_string()), Some("CREATEDB".to_string()))]
    );

    // Server grants access and endpoints in one write: only Created fires
    provider.set_credentials(deployment.server_id, "orders_user", "s3cret").unwrap();
    provider.set_endpoints(deployment.server_id, "pg-0:5432").unwrap();
    deployment.server_to_client();
    assert_eq!(
        requirer.on_peer_changed(&PeerTrigger::new(deployment.client_id)).unwrap(),
        Some(EventKind::Created)
    );

    // Nothing new
    assert_eq!(
        requirer.on_peer_changed(&PeerTrigger::new(deployment.client_id)).unwrap(),
        None
    );

    // Server adds a replica
    provider.set_read_only_endpoints(deployment.server_id, "pg-1:5432").unwrap();
    deployment.server_to_client();
    assert_eq!(
        requirer.on_peer_changed(&PeerTrigger::new(deployment.client_id)).unwrap(),
        Some(EventKind::ReadOnlyEndpointsChanged)
    );

    // Failover moves the primary
    provider.set_endpoints(deployment.server_id, "pg-1:5432").unwrap();
    provider.set_read_only_endpoints(deployment.server_id, "pg-0:5432").unwrap();
    deployment.server_to_client();
    assert_eq!(
        requirer.on_peer_changed(&PeerTrigger::new(deployment.client_id)).unwrap(),
        Some(EventKind::EndpointsChanged)
    );

    let events = client_events.lock();
    let names: Vec<&str> = events.iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        vec!["database_created", "read_only_endpoints_changed", "endpoints_changed"]
    );
    assert_eq!(events[0].1.get("endpoints").map(String::as_str), Some("pg-0:5432"));
    assert_eq!(events[2].1.get("read-only-endpoints").map(String::as_str), Some("pg-0:5432"));
}

#[test]
fn provider_request_is_not_repeated_for_unrelated_updates() {
    let deployment = Deployment::new("database");
    let requirer = RequirerManager::new(
        RelationConfig::new("database", Protocol::Database, vec!["orders".into()]),
        deployment.client.clone(),
    )
    .unwrap();
    let provider = ProviderManager::new(ProviderConfig::default(), deployment.server.clone()).unwrap();
    let trigger = PeerTrigger::new(deployment.server_id);

    requirer.on_peer_joined(&PeerTrigger::new(deployment.client_id)).unwrap();
    deployment.client_to_server();
    assert_eq!(provider.on_peer_changed(&trigger).unwrap(), Some(EventKind::Requested));

    deployment
        .client
        .update_bag(deployment.client_id, Bag::LocalApp, &snapshot(&[("extra-user-roles", "admin")]))
        .unwrap();
    deployment.client_to_server();
    assert_eq!(provider.on_peer_changed(&trigger).unwrap(), None);
}

#[test]
fn kafka_client_follows_broker_changes() {
    let deployment = Deployment::new("kafka-client");
    let mut requirer = RequirerManager::new(
        RelationConfig::new("kafka-client", Protocol::MessageBroker, vec!["orders".into()])
            .with_extra_user_roles("producer"),
        deployment.client.clone(),
    )
    .unwrap();
    let provider = ProviderManager::new(
        ProviderConfig::new("kafka-client", Protocol::MessageBroker),
        deployment.server.clone(),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in ["topic_created", "bootstrap_server_changed", "credentials_changed"] {
        let sink = seen.clone();
        requirer
            .subscribe(name, move |event| {
                sink.lock().push((event.name, event.broker().bootstrap_server().map(str::to_string)))
            })
            .unwrap();
    }
    let trigger = PeerTrigger::new(deployment.client_id);

    requirer.on_peer_joined(&trigger).unwrap();
    deployment.client_to_server();
    provider.on_peer_changed(&PeerTrigger::new(deployment.server_id)).unwrap();

    provider.set_credentials(deployment.server_id, "u", "p").unwrap();
    provider.set_bootstrap_server(deployment.server_id, "k0:9092").unwrap();
    deployment.server_to_client();
    requirer.on_peer_changed(&trigger).unwrap();

    provider.set_bootstrap_server(deployment.server_id, "k0:9092,k1:9092").unwrap();
    deployment.server_to_client();
    requirer.on_peer_changed(&trigger).unwrap();

    provider.set_credentials(deployment.server_id, "u", "rotated").unwrap();
    deployment.server_to_client();
    requirer.on_peer_changed(&trigger).unwrap();

    assert_eq!(
        seen.lock().clone(),
        vec![
            ("topic_created", Some("k0:9092".to_string())),
            ("bootstrap_server_changed", Some("k0:9092,k1:9092".to_string())),
            ("credentials_changed", Some("k0:9092,k1:9092".to_string())),
        ]
    );
}

#[test]
fn multiple_clusters_are_told_apart_by_alias() {
    let client = Arc::new(MemoryRelationBackend::new());
    client.set_leader(true);
    client.set_relation_limit("database", 2);
    let first = client.add_relation("database", "pg-east");
    let second = client.add_relation("database", "pg-west");

    let mut requirer = RequirerManager::new(
        RelationConfig::new("database", Protocol::Database, vec!["orders".into()])
            .with_relation_aliases(["cluster1", "cluster2"]),
        client.clone(),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    for name in ["database_created", "cluster1_database_created", "cluster2_database_created"] {
        let sink = seen.clone();
        let tag = name.to_string();
        requirer
            .subscribe(name, move |event| sink.lock().push((tag.clone(), event.remote_app.clone())))
            .unwrap();
    }

    requirer.on_peer_joined(&PeerTrigger::new(first)).unwrap();
    requirer.on_peer_joined(&PeerTrigger::new(second)).unwrap();

    client
        .update_remote(first, &snapshot(&[("username", "u1"), ("password", "p1")]))
        .unwrap();
    requirer.on_peer_changed(&PeerTrigger::new(first)).unwrap();

    assert_eq!(
        seen.lock().clone(),
        vec![
            ("database_created".to_string(), "pg-east".to_string()),
            ("cluster1_database_created".to_string(), "pg-east".to_string()),
        ]
    );
    assert_eq!(requirer.alias_of(second).unwrap().as_deref(), Some("cluster2"));
}

#[test]
fn follower_units_receive_events_without_writing() {
    let deployment = Deployment::new("zookeeper");
    deployment.client.set_leader(false);

    let mut requirer = RequirerManager::new(
        RelationConfig::new("zookeeper", Protocol::Coordination, vec!["/myapp".into()]),
        deployment.client.clone(),
    )
    .unwrap();
    let provider = ProviderManager::new(
        ProviderConfig::new("zookeeper", Protocol::Coordination),
        deployment.server.clone(),
    )
    .unwrap();

    let seen = Arc::new(Mutex::new(0));
    let sink = seen.clone();
    requirer
        .subscribe("chroot_created", move |_| *sink.lock() += 1)
        .unwrap();

    requirer.on_peer_joined(&PeerTrigger::new(deployment.client_id)).unwrap();
    deployment.client_to_server();
    assert_eq!(
        provider.on_peer_changed(&PeerTrigger::new(deployment.server_id)).unwrap(),
        None
    );

    provider.set_credentials(deployment.server_id, "u", "p").unwrap();
    provider.set_endpoints(deployment.server_id, "z0:2181").unwrap();
    deployment.server_to_client();
    assert_eq!(
        requirer.on_peer_changed(&PeerTrigger::new(deployment.client_id)).unwrap(),
        Some(EventKind::Created)
    );
    assert_eq!(*seen.lock(), 1);
}
