mod sled_relation_backend;

pub use sled_relation_backend::*;
