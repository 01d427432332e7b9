//! Recovery storage: a small key/value store that survives a page reload.
//!
//! The browser bridge backs this with `localStorage`; native code and tests
//! use `MemoryStore`.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("recovery storage is not available")]
    Unavailable,
    #[error("recovery storage quota exceeded ({needed} bytes, {capacity} available)")]
    QuotaExceeded { needed: usize, capacity: usize },
    #[error("recovery storage error: {0}")]
    Backend(String),
}

pub trait RecoveryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store with an optional byte quota, like a browser's.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    capacity: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects values larger than `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: Some(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl RecoveryStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.capacity
            && value.len() > capacity
        {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                capacity,
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Lets a caller keep a handle on a store the session owns.
impl<S: RecoveryStore> RecoveryStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.borrow().load(key)
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.borrow_mut().save(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.borrow_mut().remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_load_remove() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load("k").unwrap(), None);
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn quota_is_enforced() {
        let mut store = MemoryStore::with_capacity(4);
        store.save("k", "1234").unwrap();
        let err = store.save("k", "12345").unwrap_err();
        assert_eq!(
            err,
            StorageError::QuotaExceeded {
                needed: 5,
                capacity: 4
            }
        );
        assert_eq!(store.get("k"), Some("1234"));
    }
}
