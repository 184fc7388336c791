use std::collections::HashSet;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Protocol;
use crate::Result;

/// Consumer side settings for one relation name
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RelationConfig {
    #[serde(default = "default_relation_name")]
    pub relation_name: String,

    #[serde(default)]
    pub protocol: Protocol,

    /// Values for the adapter's writer-supplied domain keys, in schema order
    /// (database name, topic, chroot)
    #[serde(default)]
    pub domain_fields: Vec<String>,

    /// Extra permissions requested alongside the domain fields
    #[serde(default)]
    pub extra_user_roles: Option<String>,

    /// Alias pool used to tell concurrent relation instances apart.
    /// Its length must equal the relation's declared concurrency limit.
    #[serde(default)]
    pub relation_aliases: Option<Vec<String>>,
}

impl Default for RelationConfig {
    fn default() -> Self {
        Self {
            relation_name: default_relation_name(),
            protocol: Protocol::default(),
            domain_fields: vec![],
            extra_user_roles: None,
            relation_aliases: None,
        }
    }
}

impl RelationConfig {
    pub fn new(
        relation_name: impl Into<String>,
        protocol: Protocol,
        domain_fields: Vec<String>,
    ) -> Self {
        Self {
            relation_name: relation_name.into(),
            protocol,
            domain_fields,
            extra_user_roles: None,
            relation_aliases: None,
        }
    }

    pub fn with_extra_user_roles(
        mut self,
        roles: impl Into<String>,
    ) -> Self {
        self.extra_user_roles = Some(roles.into());
        self
    }

    pub fn with_relation_aliases<I, S>(
        mut self,
        aliases: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.relation_aliases = Some(aliases.into_iter().map(Into::into).collect());
        self
    }

    /// Validates the parts of the configuration that do not depend on the runtime.
    /// The alias pool size is checked against the runtime limit at construction.
    pub fn validate(&self) -> Result<()> {
        validate_relation_name(&self.relation_name)?;

        let expected = self.protocol.schema().domain_keys.len();
        if self.domain_fields.len() != expected {
            return Err(Error::Config(ConfigError::Message(format!(
                "{} relation {} expects {} domain field(s) {:?}, got {}",
                self.protocol.as_str(),
                self.relation_name,
                expected,
                self.protocol.schema().domain_keys,
                self.domain_fields.len()
            ))));
        }

        if self.domain_fields.iter().any(|v| v.is_empty()) {
            return Err(Error::Config(ConfigError::Message(format!(
                "domain fields of relation {} cannot be empty",
                self.relation_name
            ))));
        }

        if let Some(aliases) = &self.relation_aliases {
            let mut seen = HashSet::new();
            for alias in aliases {
                if alias.is_empty() {
                    return Err(Error::Config(ConfigError::Message(
                        "relation alias cannot be empty".into(),
                    )));
                }
                if !seen.insert(alias.as_str()) {
                    return Err(Error::Config(ConfigError::Message(format!(
                        "Duplicate relation alias {alias}"
                    ))));
                }
            }
        }

        Ok(())
    }
}

/// Provider side settings for one relation name
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_relation_name")]
    pub relation_name: String,

    #[serde(default)]
    pub protocol: Protocol,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            relation_name: default_relation_name(),
            protocol: Protocol::default(),
        }
    }
}

impl ProviderConfig {
    pub fn new(
        relation_name: impl Into<String>,
        protocol: Protocol,
    ) -> Self {
        Self {
            relation_name: relation_name.into(),
            protocol,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_relation_name(&self.relation_name)
    }
}

fn validate_relation_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Config(ConfigError::Message(
            "relation_name cannot be empty".into(),
        )));
    }
    Ok(())
}

fn default_relation_name() -> String {
    "database".to_string()
}
