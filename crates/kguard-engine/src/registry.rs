use crate::check::Check;
use crate::error::RegistryError;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// Lookup table of checks by id.
///
/// Nothing registers itself: a composition root fills the registry explicitly
/// at startup. Reads vastly outnumber writes, hence the `RwLock`.
#[derive(Debug, Default)]
pub struct Registry {
    checks: RwLock<HashMap<String, Arc<Check>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry. Starts empty.
    pub fn global() -> &'static Registry {
        static GLOBAL: OnceLock<Registry> = OnceLock::new();
        GLOBAL.get_or_init(Registry::new)
    }

    pub fn register(&self, check: Check) -> Result<Arc<Check>, RegistryError> {
        if check.id().is_empty() {
            return Err(RegistryError::EmptyId);
        }
        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);
        if checks.contains_key(check.id()) {
            return Err(RegistryError::Duplicate(check.id().to_string()));
        }
        debug!(check = check.id(), scope = %check.scope(), "registered check");
        let check = Arc::new(check);
        checks.insert(check.id().to_string(), check.clone());
        Ok(check)
    }

    pub fn lookup(&self, id: &str) -> Option<Arc<Check>> {
        self.read().get(id).cloned()
    }

    /// Every registered check, in no particular order.
    pub fn all(&self) -> Vec<Arc<Check>> {
        self.read().values().cloned().collect()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn delete(&self, id: &str) -> Option<Arc<Check>> {
        self.checks
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<Check>>> {
        self.checks.read().unwrap_or_else(PoisonError::into_inner)
    }
}
