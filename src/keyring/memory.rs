//! In-memory key source

use crate::error::Result;
use crate::KeySource;

use std::collections::HashMap;
use std::sync::RwLock;

/// A key source holding PEM text in memory
///
/// Useful for tests and for embedding keys delivered through another
/// channel. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryKeySource {
    store: RwLock<HashMap<String, String>>,
}

impl MemoryKeySource {
    /// Creates an empty source
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeySource for MemoryKeySource {
    fn read(&self, name: &str) -> Result<Option<String>> {
        let store = self.store.read().unwrap();

        Ok(store.get(name).cloned())
    }

    fn write(&self, name: &str, pem: &str) -> Result<()> {
        let mut store = self.store.write().unwrap();
        store.insert(name.to_string(), pem.to_string());

        Ok(())
    }
}
