use std::any::Any;
use std::sync::Arc;

use tracing::{debug, info};

use crate::container::builder::ContainerBuilder;
use crate::container::cache::SingletonCache;
use crate::container::lifetime::{Lifetime, SingletonState};
use crate::container::registration::Instance;
use crate::container::registry::RegistrationStore;
use crate::container::resolver::{DependencyGraph, Resolver};
use crate::container::snapshot::{ContainerSnapshot, RegistrationSnapshot};
use crate::errors::ContainerError;

/// Serving-phase container: resolves components by name, never registers.
///
/// Share it as `Arc<Container>`; resolution is safe from any number of threads
/// and each singleton is built at most once.
pub struct Container {
    store: RegistrationStore,
    cache: SingletonCache,
}

impl Container {
    /// Start a bootstrap phase
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn from_parts(store: RegistrationStore, cache: SingletonCache) -> Self {
        Self { store, cache }
    }

    /// Resolve a component by name
    pub fn resolve(&self, name: &str) -> Result<Instance, ContainerError> {
        Resolver::new(&self.store, &self.cache).resolve(name)
    }

    /// Resolve a component and downcast it to `T`
    pub fn resolve_as<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ContainerError> {
        self.resolve(name)?
            .downcast::<T>()
            .map_err(|_| ContainerError::type_mismatch::<T>(name))
    }

    /// Try to resolve a component, returning None on any failure
    pub fn try_resolve_as<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.resolve_as::<T>(name).ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.store.contains(name)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names = self.store.names().to_vec();
        names.sort();
        names
    }

    pub fn lifetime_of(&self, name: &str) -> Option<Lifetime> {
        self.store.get(name).map(|registration| registration.lifetime())
    }

    pub fn dependencies_of(&self, name: &str) -> Option<&[String]> {
        self.store.get(name).map(|registration| registration.dependencies())
    }

    /// Build state of a singleton; `None` for other lifetimes
    pub fn singleton_state(&self, name: &str) -> Option<SingletonState> {
        self.cache.state(name)
    }

    /// All registrations, dependencies before dependents
    pub fn resolution_order(&self) -> Result<Vec<String>, ContainerError> {
        DependencyGraph::from_store(&self.store).topological_sort()
    }

    /// Build every singleton up front, returning how many were built by this call
    pub fn instantiate_singletons(&self) -> Result<usize, ContainerError> {
        let before = self.cache.built_count();
        for name in self.resolution_order()? {
            if self.cache.state(&name) == Some(SingletonState::Unbuilt) {
                debug!(component = %name, "warming singleton");
                self.resolve(&name)?;
            }
        }

        let built = self.cache.built_count() - before;
        info!(built, total = self.cache.len(), "singletons instantiated");
        Ok(built)
    }

    /// Serializable description of every registration
    pub fn snapshot(&self) -> ContainerSnapshot {
        let registrations = self
            .store
            .iter()
            .map(|registration| RegistrationSnapshot {
                name: registration.name().to_string(),
                lifetime: registration.lifetime(),
                dependencies: registration.dependencies().to_vec(),
                state: self.cache.state(registration.name()),
            })
            .collect();

        ContainerSnapshot {
            components: self.store.len(),
            singletons_built: self.cache.built_count(),
            registrations,
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("components", &self.store.len())
            .field("singletons", &self.cache.len())
            .field("singletons_built", &self.cache.built_count())
            .finish()
    }
}
