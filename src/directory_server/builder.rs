//! Builder pattern for configuring directory server instances.
//!
//! This module provides the serializable [`DirectoryConfig`] and a fluent
//! builder that seeds the tree and starts the scheduler.

use crate::directory_server::DirectoryServer;
use crate::dit::Dit;
use crate::entry::Entry;
use crate::error::{DirectoryError, DirectoryResult};
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Runtime settings of a directory server.
///
/// Absent fields take their defaults when deserializing, so `{}` is a valid
/// configuration.
///
/// # Examples
///
/// ```rust
/// use ldap_dit::DirectoryConfig;
///
/// let config = DirectoryConfig::from_json(r#"{"sizeLimit": 500}"#).unwrap();
/// assert_eq!(config.size_limit, 500);
/// assert_eq!(config.queue_capacity, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DirectoryConfig {
    /// Units of work that may wait in the queue before submitters are held back.
    pub queue_capacity: usize,

    /// Maximum entries a search may return; 0 means unlimited.
    pub size_limit: usize,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 64,
            size_limit: 0,
        }
    }
}

impl DirectoryConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the text is not valid JSON for this type or
    /// fails [`validate`](Self::validate).
    pub fn from_json(text: &str) -> DirectoryResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(|e| DirectoryError::Configuration {
            message: format!("Failed to parse configuration: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.queue_capacity == 0 {
            return Err(DirectoryError::Configuration {
                message: "Queue capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for configuring and starting directory server instances.
///
/// # Examples
///
/// ```rust
/// use ldap_dit::{DirectoryServerBuilder, Dn, Entry, EntryOptions, Schema};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let schema = Arc::new(Schema::core()?);
/// let dn = Dn::parse(&schema, "dc=dev")?;
/// let entry = Entry::new(&schema, dn.clone(), EntryOptions::new("domain"))?;
///
/// let server = DirectoryServerBuilder::new(schema)
///     .with_queue_capacity(16)
///     .with_size_limit(100)
///     .with_entries(vec![entry])
///     .build()?;
///
/// assert!(server.get_entry(&dn).await.is_ok());
/// server.shutdown().await?;
/// # Ok(())
/// # }
/// ```
pub struct DirectoryServerBuilder {
    schema: Arc<Schema>,
    config: DirectoryConfig,
    entries: Vec<Entry>,
}

impl DirectoryServerBuilder {
    /// Start from the default configuration and an empty tree.
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            config: DirectoryConfig::default(),
            entries: Vec::new(),
        }
    }

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: DirectoryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    pub fn with_size_limit(mut self, limit: usize) -> Self {
        self.config.size_limit = limit;
        self
    }

    /// Entries to load before the server accepts requests.
    ///
    /// They are inserted in order at their own DNs, so parents must come
    /// before their children.
    pub fn with_entries(mut self, entries: impl IntoIterator<Item = Entry>) -> Self {
        self.entries.extend(entries);
        self
    }

    /// Validate the configuration, load the initial entries and spawn the
    /// worker task.
    ///
    /// # Errors
    ///
    /// * `Configuration` for an invalid configuration, or when called outside
    ///   a Tokio runtime
    /// * any error from inserting an initial entry
    pub fn build(self) -> DirectoryResult<DirectoryServer> {
        self.config.validate()?;
        let mut dit = Dit::new(self.schema);
        for entry in self.entries {
            let dn = entry.dn().clone();
            dit.insert_entry(&dn, entry)?;
        }
        DirectoryServer::start(dit, self.config)
    }
}
