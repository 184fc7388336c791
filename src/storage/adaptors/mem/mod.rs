mod mem_relation_backend;

pub use mem_relation_backend::*;
