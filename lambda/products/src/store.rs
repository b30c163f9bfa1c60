//! Storage port for the products table.
//!
//! The dispatcher only talks to [`ProductStore`]; `main` injects the DynamoDB
//! adapter and the tests inject the in-memory store.

use serde_json::{Map, Value};
use std::future::Future;

#[cfg(test)]
pub(crate) mod memory;

/// Name of the partition key attribute.
pub(crate) const KEY_ATTRIBUTE: &str = "id";

/// A schema-free table item.
pub(crate) type Item = Map<String, Value>;

/// One page of a table scan.
#[derive(Debug, Default)]
pub(crate) struct ScanPage {
    pub items: Vec<Item>,
    /// Present when the scan stopped early; pass it back to continue.
    pub last_evaluated_key: Option<Item>,
}

pub(crate) trait ProductStore {
    fn get(&self, id: &str) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send;

    fn scan(
        &self,
        exclusive_start_key: Option<Item>,
    ) -> impl Future<Output = Result<ScanPage, StoreError>> + Send;

    /// Write `item`, replacing any item with the same key.
    fn put(&self, item: Item) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Set a single attribute and return the new values of the updated attributes.
    fn update_attribute(
        &self,
        id: &str,
        attribute: &str,
        value: Value,
    ) -> impl Future<Output = Result<Item, StoreError>> + Send;

    /// Remove the item and return it as it was before deletion, if it existed.
    fn delete(&self, id: &str) -> impl Future<Output = Result<Option<Item>, StoreError>> + Send;
}

/// Failure reported by the storage backend.
///
/// The display text is the backend's own message and is what callers see.
#[derive(Debug, thiserror::Error)]
pub(crate) enum StoreError {
    #[error("{message}")]
    Service {
        code: Option<String>,
        message: String,
    },
    #[error("{0}")]
    Transport(String),
}

impl StoreError {
    pub fn service(code: Option<&str>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }

    /// Service error code, e.g. `ResourceNotFoundException`.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Service { code, .. } => code.as_deref(),
            Self::Transport(_) => None,
        }
    }
}
