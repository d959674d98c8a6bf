use std::any::Any;

use tracing::{debug, info};

use crate::container::cache::SingletonCache;
use crate::container::container::Container;
use crate::container::registration::{Arguments, Registration, RegistrationOptions, Target};
use crate::container::registry::RegistrationStore;
use crate::container::resolver::DependencyGraph;
use crate::errors::{BoxError, ContainerError};

/// Bootstrap-phase registry. Consumed by [`freeze`](Self::freeze) or
/// [`build`](Self::build); the resulting [`Container`] cannot register.
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    store: RegistrationStore,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `target` under `name`.
    ///
    /// `None` options with a value target registers a plain value. With
    /// `type_ref` the target is handed out unchanged. Anything else is a
    /// factory, transient unless `singleton` is set.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        target: Target,
        options: Option<RegistrationOptions>,
    ) -> Result<(), ContainerError> {
        let registration = Registration::new(name, target, options)?;
        debug!(
            component = registration.name(),
            lifetime = %registration.lifetime(),
            dependencies = ?registration.dependencies(),
            "registering component"
        );
        self.store.insert(registration)
    }

    /// Add a plain value
    pub fn add_value<T>(mut self, name: impl Into<String>, value: T) -> Result<Self, ContainerError>
    where
        T: Any + Send + Sync,
    {
        self.register(name, Target::value(value), None)?;
        Ok(self)
    }

    /// Add a type token that is handed out as-is
    pub fn add_type<T>(mut self, name: impl Into<String>, token: T) -> Result<Self, ContainerError>
    where
        T: Any + Send + Sync,
    {
        self.register(
            name,
            Target::value(token),
            Some(RegistrationOptions::new().type_ref()),
        )?;
        Ok(self)
    }

    /// Add a factory that builds a fresh instance on every resolution
    pub fn add_transient<T, F, I, S>(
        mut self,
        name: impl Into<String>,
        dependencies: I,
        factory: F,
    ) -> Result<Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(
            name,
            Target::factory(factory),
            Some(RegistrationOptions::new().dependencies(dependencies)),
        )?;
        Ok(self)
    }

    /// Add a factory whose first successful result is shared
    pub fn add_singleton<T, F, I, S>(
        mut self,
        name: impl Into<String>,
        dependencies: I,
        factory: F,
    ) -> Result<Self, ContainerError>
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(
            name,
            Target::factory(factory),
            Some(
                RegistrationOptions::new()
                    .dependencies(dependencies)
                    .singleton(),
            ),
        )?;
        Ok(self)
    }

    /// Configure the builder from a configuration closure
    pub fn configure<F>(self, configure: F) -> Result<Self, ContainerError>
    where
        F: FnOnce(Self) -> Result<Self, ContainerError>,
    {
        configure(self)
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

    /// Check the declared graph: no dangling names, no cycles
    pub fn validate(&self) -> Result<(), ContainerError> {
        let graph = DependencyGraph::from_store(&self.store);
        graph.check_references()?;
        graph.detect_cycles()
    }

    /// End the bootstrap phase.
    ///
    /// Cycles are rejected here: two threads entering a cyclic pair of
    /// singletons from opposite ends would each hold one cell and wait on the
    /// other. Missing names still surface on the `resolve` that reaches them.
    pub fn freeze(self) -> Result<Container, ContainerError> {
        DependencyGraph::from_store(&self.store).detect_cycles()?;

        let cache = SingletonCache::for_store(&self.store);
        info!(
            components = self.store.len(),
            singletons = cache.len(),
            "container frozen"
        );
        Ok(Container::from_parts(self.store, cache))
    }

    /// Validate, then freeze
    pub fn build(self) -> Result<Container, ContainerError> {
        self.validate()?;
        self.freeze()
    }
}
