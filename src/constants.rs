// -
// Private slot keys

/// Local-unit key holding the JSON encoded baseline snapshot.
/// Never part of a diff or of any consumer listing.
pub const DATA_KEY: &str = "data";

/// Local-unit key holding the alias assigned to a relation instance
pub const ALIAS_KEY: &str = "alias";

// -
// Shared schema keys

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const ENDPOINTS_KEY: &str = "endpoints";
pub const READ_ONLY_ENDPOINTS_KEY: &str = "read-only-endpoints";
pub const REPLSET_KEY: &str = "replset";
pub const URIS_KEY: &str = "uris";
pub const VERSION_KEY: &str = "version";
pub const TLS_KEY: &str = "tls";
pub const TLS_CA_KEY: &str = "tls-ca";
pub const ZOOKEEPER_URIS_KEY: &str = "zookeeper-uris";
pub const CONSUMER_GROUP_PREFIX_KEY: &str = "consumer-group-prefix";
pub const EXTRA_USER_ROLES_KEY: &str = "extra-user-roles";
pub const DATABASE_KEY: &str = "database";
pub const TOPIC_KEY: &str = "topic";
pub const CHROOT_KEY: &str = "chroot";

// -
// Sled namespaces

/// Tree holding the relation registry (id -> record)
pub(crate) const RELATION_REGISTRY_TREE: &str = "_relation_registry";
/// Tree holding per relation name concurrency limits
pub(crate) const RELATION_LIMIT_TREE: &str = "_relation_limits";
pub(crate) const BAG_TREE_PREFIX: &str = "_bag";
pub(crate) const NEXT_RELATION_ID_KEY: &str = "_next_relation_id";
