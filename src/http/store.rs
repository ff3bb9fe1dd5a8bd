//! Per-request key/value store shared between middleware and handlers.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Errors reading from the request store.
///
/// Both variants point at a handler bug: a middleware that was expected to
/// run did not, or wrote a different type than the reader asks for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("key \"{0}\" does not exist")]
    MissingKey(String),

    #[error("key \"{key}\" holds a value that is not a {expected}")]
    TypeMismatch { key: String, expected: &'static str },
}

struct Entry {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Typed values keyed by string, owned by a single request.
#[derive(Default)]
pub struct Store {
    entries: HashMap<String, Entry>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value under `key`.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(
            key.into(),
            Entry {
                value: Box::new(value),
                type_name: type_name::<T>(),
            },
        );
    }

    /// Strict read: the key must exist and hold a `T`.
    pub fn get<T: Any>(&self, key: &str) -> Result<&T, StoreError> {
        let entry = self
            .entries
            .get(key)
            .ok_or_else(|| StoreError::MissingKey(key.to_string()))?;
        entry
            .value
            .downcast_ref::<T>()
            .ok_or_else(|| StoreError::TypeMismatch {
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Lenient read: `None` when absent or of another type.
    pub fn try_get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.value.downcast_ref::<T>()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, e)| (k, e.type_name)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_then_get() {
        let mut store = Store::new();
        store.set("example", "12345".to_string());
        assert_eq!(store.get::<String>("example").unwrap(), "12345");
        assert_eq!(store.try_get::<String>("example").map(String::as_str), Some("12345"));
    }

    #[test]
    fn test_missing_key() {
        let store = Store::new();
        assert_eq!(
            store.get::<String>("example").unwrap_err(),
            StoreError::MissingKey("example".to_string())
        );
        assert!(store.try_get::<String>("example").is_none());
    }

    #[test]
    fn test_type_mismatch() {
        let mut store = Store::new();
        store.set("count", 3u32);
        let err = store.get::<String>("count").unwrap_err();
        assert!(matches!(err, StoreError::TypeMismatch { .. }));
        assert!(store.try_get::<String>("count").is_none());
        assert_eq!(*store.get::<u32>("count").unwrap(), 3);
    }

    #[test]
    fn test_overwrite_and_remove() {
        let mut store = Store::new();
        store.set("k", 1i64);
        store.set("k", "now a string");
        assert_eq!(*store.get::<&str>("k").unwrap(), "now a string");
        assert_eq!(store.len(), 1);
        assert!(store.remove("k"));
        assert!(store.is_empty());
    }
}
