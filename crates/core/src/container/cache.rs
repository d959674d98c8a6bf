use std::collections::HashMap;

use once_cell::sync::OnceCell;

use crate::container::lifetime::SingletonState;
use crate::container::registration::Instance;
use crate::container::registry::RegistrationStore;
use crate::errors::ContainerError;

/// Built singleton instances, one once-guard per singleton registration.
///
/// Cells are created when the container is frozen, so the map itself is never
/// mutated while serving; only the cells fill in, at most once each.
#[derive(Debug, Default)]
pub struct SingletonCache {
    cells: HashMap<String, OnceCell<Instance>>,
}

impl SingletonCache {
    /// Allocate an empty cell for every singleton in the store
    pub fn for_store(store: &RegistrationStore) -> Self {
        let cells = store
            .iter()
            .filter(|registration| registration.lifetime().is_singleton())
            .map(|registration| (registration.name().to_string(), OnceCell::new()))
            .collect();

        Self { cells }
    }

    /// Cached instance, if already built. Never blocks.
    pub fn get(&self, name: &str) -> Option<Instance> {
        self.cells.get(name)?.get().cloned()
    }

    /// Return the cached instance or build it with `init`.
    ///
    /// Concurrent callers for the same name wait for the first builder and
    /// share its result. A failed `init` leaves the cell empty.
    pub fn get_or_try_init<F>(&self, name: &str, init: F) -> Result<Instance, ContainerError>
    where
        F: FnOnce() -> Result<Instance, ContainerError>,
    {
        match self.cells.get(name) {
            Some(cell) => cell.get_or_try_init(init).cloned(),
            None => init(),
        }
    }

    pub fn state(&self, name: &str) -> Option<SingletonState> {
        self.cells.get(name).map(|cell| match cell.get() {
            Some(_) => SingletonState::Built,
            None => SingletonState::Unbuilt,
        })
    }

    /// Number of singletons built so far
    pub fn built_count(&self) -> usize {
        self.cells.values().filter(|cell| cell.get().is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::registration::{Registration, RegistrationOptions, Target};
    use std::sync::Arc;

    fn store() -> RegistrationStore {
        let mut store = RegistrationStore::new();
        store
            .insert(Registration::new("Conn", Target::value("db"), None).unwrap())
            .unwrap();
        store
            .insert(
                Registration::new(
                    "Repo",
                    Target::factory(|_| Ok(1u32)),
                    Some(RegistrationOptions::new().singleton()),
                )
                .unwrap(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_cells_only_for_singletons() {
        let cache = SingletonCache::for_store(&store());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.state("Repo"), Some(SingletonState::Unbuilt));
        assert_eq!(cache.state("Conn"), None);
    }

    #[test]
    fn test_failed_init_is_not_cached() {
        let cache = SingletonCache::for_store(&store());

        let err = cache
            .get_or_try_init("Repo", || Err(ContainerError::construction("Repo", "boom".into())))
            .unwrap_err();
        assert!(err.is_construction());
        assert!(cache.get("Repo").is_none());

        let built = cache
            .get_or_try_init("Repo", || Ok(Arc::new(5u32) as Instance))
            .unwrap();
        let again = cache.get("Repo").unwrap();
        assert!(Arc::ptr_eq(&built, &again));
        assert_eq!(cache.state("Repo"), Some(SingletonState::Built));
        assert_eq!(cache.built_count(), 1);
    }
}
