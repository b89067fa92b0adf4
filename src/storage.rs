//! Tab-scoped key-value storage.
//!
//! Values live exactly as long as one browser tab (or one host process) and are
//! never shared between tabs. Session identity depends on that scope: a store
//! that survives restarts would merge unrelated visits into one session.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::{bail, Result};

/// Ephemeral storage scoped to a single tab.
///
/// Implementations may refuse access entirely (privacy modes); callers treat
/// errors as "nothing stored" and keep going.
pub trait TabStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process tab storage. Clones share the same scope.
#[derive(Clone, Default)]
pub struct MemoryTabStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl TabStorage for MemoryTabStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage that rejects every access, as browsers do when storage is blocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockedTabStorage;

impl TabStorage for BlockedTabStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        bail!("tab storage unavailable (read {key})")
    }

    fn set(&self, key: &str, _value: &str) -> Result<()> {
        bail!("tab storage unavailable (write {key})")
    }
}
