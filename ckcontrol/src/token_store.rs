//! Persistence contract for the remote access token.
//!
//! The controllers never persist anything themselves: they go through a
//! [`TokenStore`] provided by the host application (keychain, config file,
//! ...). Every call may fail and no failure is fatal to the caller.

use std::sync::Mutex;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no value stored under '{0}'")]
    NotFound(String),
    #[error("token store failure: {0}")]
    Backend(String),
}

/// Get/save/delete a single secret string under [`TokenStore::coding_key`].
pub trait TokenStore: Send + Sync {
    /// Key the secret is persisted under.
    fn coding_key(&self) -> &str;

    /// Fails with [`StoreError::NotFound`] when nothing is stored.
    fn get(&self) -> Result<String, StoreError>;

    fn save(&self, value: &str) -> Result<(), StoreError>;

    fn delete(&self) -> Result<(), StoreError>;
}

/// Process-local store, nothing survives a restart.
#[derive(Debug)]
pub struct MemoryTokenStore {
    coding_key: String,
    value: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new(coding_key: impl Into<String>) -> Self {
        Self {
            coding_key: coding_key.into(),
            value: Mutex::new(None),
        }
    }

    pub fn with_value(coding_key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            coding_key: coding_key.into(),
            value: Mutex::new(Some(value.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn coding_key(&self) -> &str {
        &self.coding_key
    }

    fn get(&self) -> Result<String, StoreError> {
        self.value
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .clone()
            .ok_or_else(|| StoreError::NotFound(self.coding_key.clone()))
    }

    fn save(&self, value: &str) -> Result<(), StoreError> {
        *self
            .value
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))? = Some(value.to_string());
        Ok(())
    }

    fn delete(&self) -> Result<(), StoreError> {
        *self
            .value
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))? = None;
        Ok(())
    }
}
