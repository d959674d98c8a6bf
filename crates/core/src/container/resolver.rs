use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};

use crate::container::cache::SingletonCache;
use crate::container::registration::{Arguments, Factory, Instance, Recipe};
use crate::container::registry::RegistrationStore;
use crate::errors::ContainerError;

/// Names currently being constructed, outermost first
#[derive(Debug, Clone, Default)]
pub struct ResolutionPath {
    names: Vec<String>,
}

impl ResolutionPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.names.pop()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|entry| entry == name)
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    /// The cycle closed by revisiting `name`, e.g. `[A, B, A]`
    pub fn cycle_to(&self, name: &str) -> Vec<String> {
        let start = self
            .names
            .iter()
            .position(|entry| entry == name)
            .unwrap_or(0);
        let mut cycle = self.names[start..].to_vec();
        cycle.push(name.to_string());
        cycle
    }

    pub fn path_string(&self) -> String {
        self.names.join(" -> ")
    }
}

/// Recursive resolution of one top-level request.
///
/// Each call to [`Container::resolve`](crate::container::Container::resolve)
/// gets its own resolver, so the active path is never shared between threads.
pub(crate) struct Resolver<'a> {
    store: &'a RegistrationStore,
    cache: &'a SingletonCache,
    path: ResolutionPath,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(store: &'a RegistrationStore, cache: &'a SingletonCache) -> Self {
        Self {
            store,
            cache,
            path: ResolutionPath::new(),
        }
    }

    pub(crate) fn resolve(&mut self, name: &str) -> Result<Instance, ContainerError> {
        self.resolve_from(name, None)
    }

    fn resolve_from(
        &mut self,
        name: &str,
        required_by: Option<&str>,
    ) -> Result<Instance, ContainerError> {
        let store = self.store;
        let registration = store
            .get(name)
            .ok_or_else(|| ContainerError::unknown(name, required_by))?;

        match registration.recipe() {
            Recipe::Value(instance) | Recipe::TypeRef(instance) => Ok(instance.clone()),
            Recipe::Factory {
                build,
                dependencies,
                singleton: true,
            } => {
                if let Some(instance) = self.cache.get(name) {
                    trace!(component = name, "singleton cache hit");
                    return Ok(instance);
                }

                // The path check must precede the cell: re-entering a cell that is
                // being initialised on this thread would block forever.
                self.enter(name)?;
                let cache = self.cache;
                let result =
                    cache.get_or_try_init(name, || self.construct(name, build, dependencies));
                self.path.pop();
                result
            }
            Recipe::Factory {
                build,
                dependencies,
                singleton: false,
            } => {
                self.enter(name)?;
                let result = self.construct(name, build, dependencies);
                self.path.pop();
                result
            }
        }
    }

    fn enter(&mut self, name: &str) -> Result<(), ContainerError> {
        if self.path.contains(name) {
            let cycle = self.path.cycle_to(name);
            debug!(cycle = %cycle.join(" -> "), "circular dependency");
            return Err(ContainerError::CircularDependency { cycle });
        }
        self.path.push(name);
        Ok(())
    }

    fn construct(
        &mut self,
        name: &str,
        build: &Factory,
        dependencies: &[String],
    ) -> Result<Instance, ContainerError> {
        let mut entries = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            let instance = self.resolve_from(dependency, Some(name))?;
            entries.push((dependency.clone(), instance));
        }

        debug!(
            component = name,
            arguments = entries.len(),
            depth = self.path.depth(),
            "constructing component"
        );

        let arguments = Arguments::new(name, entries);
        build(&arguments).map_err(|source| {
            warn!(component = name, error = %source, "component construction failed");
            ContainerError::construction(name, source)
        })
    }
}

/// Declared dependency graph, for validation before serving
#[derive(Debug)]
pub struct DependencyGraph {
    order: Vec<String>,
    edges: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn from_store(store: &RegistrationStore) -> Self {
        let order = store.names().to_vec();
        let edges = store
            .iter()
            .map(|registration| {
                (
                    registration.name().to_string(),
                    registration.dependencies().to_vec(),
                )
            })
            .collect();

        Self { order, edges }
    }

    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.edges.get(name).map(Vec::as_slice)
    }

    /// Every declared dependency must be registered
    pub fn check_references(&self) -> Result<(), ContainerError> {
        for name in &self.order {
            for dependency in &self.edges[name] {
                if !self.edges.contains_key(dependency) {
                    return Err(ContainerError::unknown(dependency, Some(name)));
                }
            }
        }
        Ok(())
    }

    /// Detect circular dependencies
    pub fn detect_cycles(&self) -> Result<(), ContainerError> {
        self.topological_sort().map(|_| ())
    }

    /// Dependencies before dependents; ties keep registration order
    pub fn topological_sort(&self) -> Result<Vec<String>, ContainerError> {
        let mut visited = HashSet::new();
        let mut path = ResolutionPath::new();
        let mut sorted = Vec::with_capacity(self.order.len());

        for name in &self.order {
            self.visit(name, &mut visited, &mut path, &mut sorted)?;
        }

        Ok(sorted)
    }

    fn visit(
        &self,
        name: &str,
        visited: &mut HashSet<String>,
        path: &mut ResolutionPath,
        sorted: &mut Vec<String>,
    ) -> Result<(), ContainerError> {
        if path.contains(name) {
            return Err(ContainerError::CircularDependency {
                cycle: path.cycle_to(name),
            });
        }
        if visited.contains(name) {
            return Ok(());
        }

        // Unregistered names are reported by `check_references`.
        let Some(dependencies) = self.edges.get(name) else {
            return Ok(());
        };

        path.push(name);
        for dependency in dependencies {
            self.visit(dependency, visited, path, sorted)?;
        }
        path.pop();

        visited.insert(name.to_string());
        sorted.push(name.to_string());
        Ok(())
    }
}
