use std::path::PathBuf;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Settings of the embedded database behind the durable backend
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_db_root_dir")]
    pub db_root_dir: PathBuf,

    /// Page cache size in bytes
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Background flush interval; `None` flushes only on demand
    #[serde(default = "default_flush_every_ms")]
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_root_dir: default_db_root_dir(),
            cache_capacity: default_cache_capacity(),
            flush_every_ms: default_flush_every_ms(),
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.db_root_dir.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::Message(
                "db_root_dir path cannot be empty".into(),
            )));
        }

        if self.cache_capacity == 0 {
            return Err(Error::Config(ConfigError::Message(
                "cache_capacity must be greater than 0".into(),
            )));
        }

        if self.flush_every_ms == Some(0) {
            return Err(Error::Config(ConfigError::Message(
                "flush_every_ms cannot be 0, leave it unset to disable background flush".into(),
            )));
        }

        Ok(())
    }
}

fn default_db_root_dir() -> PathBuf {
    PathBuf::from("./db")
}
fn default_cache_capacity() -> u64 {
    10 * 1024 * 1024 //10MB
}
fn default_flush_every_ms() -> Option<u64> {
    Some(3)
}
