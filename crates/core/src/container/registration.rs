use std::any::Any;
use std::sync::Arc;

use crate::container::lifetime::Lifetime;
use crate::errors::{BoxError, ContainerError};

/// Type-erased component instance; identity is `Arc::ptr_eq`
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Factory building a component from its positionally resolved dependencies
pub type Factory = Arc<dyn Fn(&Arguments) -> Result<Instance, BoxError> + Send + Sync>;

/// Resolved dependencies handed to a factory, in declared order
pub struct Arguments {
    owner: String,
    entries: Vec<(String, Instance)>,
}

impl Arguments {
    pub(crate) fn new(owner: &str, entries: Vec<(String, Instance)>) -> Self {
        Self {
            owner: owner.to_string(),
            entries,
        }
    }

    /// Name of the component being constructed
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registration name of the argument at `index`
    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    /// Untyped argument at `index`
    pub fn instance(&self, index: usize) -> Result<&Instance, ContainerError> {
        self.entries
            .get(index)
            .map(|(_, instance)| instance)
            .ok_or_else(|| {
                ContainerError::invalid(
                    &self.owner,
                    format!(
                        "factory requested argument {} but only {} dependencies are declared",
                        index,
                        self.entries.len()
                    ),
                )
            })
    }

    /// Argument at `index` downcast to `T`
    pub fn get<T: Any + Send + Sync>(&self, index: usize) -> Result<Arc<T>, ContainerError> {
        let instance = self.instance(index)?;
        instance.clone().downcast::<T>().map_err(|_| {
            let name = self.name(index).unwrap_or_default();
            ContainerError::type_mismatch::<T>(name)
        })
    }
}

impl std::fmt::Debug for Arguments {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arguments")
            .field("owner", &self.owner)
            .field(
                "names",
                &self.entries.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// What a registration hands out
pub enum Target {
    /// A ready-made value
    Value(Instance),
    /// Something to construct from resolved dependencies
    Factory(Factory),
}

impl Target {
    /// Wrap a ready-made value
    pub fn value<T: Any + Send + Sync>(value: T) -> Self {
        Target::Value(Arc::new(value))
    }

    /// Wrap a value that is already shared, keeping its identity
    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Target::Value(value)
    }

    /// Wrap a typed factory
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Arguments) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Target::Factory(Arc::new(move |args: &Arguments| {
            factory(args).map(|built| Arc::new(built) as Instance)
        }))
    }
}

impl std::fmt::Debug for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Value(_) => f.debug_tuple("Value").field(&"<instance>").finish(),
            Target::Factory(_) => f.debug_tuple("Factory").field(&"<factory_fn>").finish(),
        }
    }
}

/// Options accompanying a registration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Names resolved and passed to the factory, in order
    pub dependencies: Option<Vec<String>>,
    /// Build once and share
    pub singleton: bool,
    /// Hand the target through unchanged
    pub type_ref: bool,
}

impl RegistrationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the dependency list
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Append one dependency
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies
            .get_or_insert_with(Vec::new)
            .push(name.into());
        self
    }

    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    pub fn type_ref(mut self) -> Self {
        self.type_ref = true;
        self
    }
}

/// How a registration produces its instance
pub(crate) enum Recipe {
    Value(Instance),
    TypeRef(Instance),
    Factory {
        build: Factory,
        dependencies: Vec<String>,
        singleton: bool,
    },
}

/// A named component's construction recipe
pub struct Registration {
    name: String,
    recipe: Recipe,
}

impl Registration {
    /// Validate a `(name, target, options)` triple and turn it into an entry
    pub fn new(
        name: impl Into<String>,
        target: Target,
        options: Option<RegistrationOptions>,
    ) -> Result<Self, ContainerError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ContainerError::invalid(name, "name must not be empty"));
        }

        let recipe = match (target, options) {
            (Target::Value(value), None) => Recipe::Value(value),
            (target, Some(options)) if options.type_ref => {
                if options.singleton {
                    return Err(ContainerError::invalid(
                        name,
                        "a type registration cannot be a singleton",
                    ));
                }
                if options.dependencies.as_ref().is_some_and(|deps| !deps.is_empty()) {
                    return Err(ContainerError::invalid(
                        name,
                        "a type registration cannot declare dependencies",
                    ));
                }
                match target {
                    Target::Value(token) => Recipe::TypeRef(token),
                    // The factory itself is the token; callers downcast to `Factory`.
                    Target::Factory(build) => Recipe::TypeRef(Arc::new(build)),
                }
            }
            (Target::Value(_), Some(_)) => {
                return Err(ContainerError::invalid(
                    name,
                    "a value cannot be constructed; register it without options or as a type",
                ));
            }
            (Target::Factory(build), options) => {
                let options = options.unwrap_or_default();
                let dependencies = options.dependencies.unwrap_or_default();
                if let Some(blank) = dependencies.iter().find(|dep| dep.trim().is_empty()) {
                    return Err(ContainerError::invalid(
                        name,
                        format!("dependency name '{}' must not be empty", blank),
                    ));
                }
                Recipe::Factory {
                    build,
                    dependencies,
                    singleton: options.singleton,
                }
            }
        };

        Ok(Self { name, recipe })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> Lifetime {
        match &self.recipe {
            Recipe::Value(_) => Lifetime::Value,
            Recipe::TypeRef(_) => Lifetime::Type,
            Recipe::Factory { singleton: true, .. } => Lifetime::Singleton,
            Recipe::Factory { .. } => Lifetime::Transient,
        }
    }

    /// Declared dependency names, in injection order
    pub fn dependencies(&self) -> &[String] {
        match &self.recipe {
            Recipe::Factory { dependencies, .. } => dependencies,
            _ => &[],
        }
    }

    pub(crate) fn recipe(&self) -> &Recipe {
        &self.recipe
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("lifetime", &self.lifetime())
            .field("dependencies", &self.dependencies())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Target {
        Target::factory(|_| Ok(()))
    }

    #[test]
    fn test_bare_value_is_value_lifetime() {
        let reg = Registration::new("Conn", Target::value("mongodb://x"), None).unwrap();
        assert_eq!(reg.lifetime(), Lifetime::Value);
        assert!(reg.dependencies().is_empty());
    }

    #[test]
    fn test_type_option_is_type_lifetime() {
        let reg = Registration::new(
            "ModelType",
            Target::value("model"),
            Some(RegistrationOptions::new().type_ref()),
        )
        .unwrap();
        assert_eq!(reg.lifetime(), Lifetime::Type);
    }

    #[test]
    fn test_factory_lifetimes() {
        let transient = Registration::new("Ctrl", noop(), None).unwrap();
        assert_eq!(transient.lifetime(), Lifetime::Transient);

        let singleton = Registration::new(
            "Repo",
            noop(),
            Some(RegistrationOptions::new().dependencies(["ModelType"]).singleton()),
        )
        .unwrap();
        assert_eq!(singleton.lifetime(), Lifetime::Singleton);
        assert_eq!(singleton.dependencies(), ["ModelType".to_string()]);
    }

    #[test]
    fn test_null_dependencies_mean_none() {
        let options = RegistrationOptions {
            dependencies: None,
            singleton: false,
            type_ref: false,
        };
        let reg = Registration::new("Svc", noop(), Some(options)).unwrap();
        assert!(reg.dependencies().is_empty());
    }

    #[test]
    fn test_invalid_registrations() {
        assert!(Registration::new("", noop(), None).unwrap_err().is_invalid());
        assert!(Registration::new("   ", noop(), None).unwrap_err().is_invalid());

        let err = Registration::new(
            "T",
            Target::value(1u8),
            Some(RegistrationOptions::new().type_ref().singleton()),
        )
        .unwrap_err();
        assert!(err.is_invalid());

        let err = Registration::new(
            "T",
            Target::value(1u8),
            Some(RegistrationOptions::new().type_ref().depends_on("X")),
        )
        .unwrap_err();
        assert!(err.is_invalid());

        let err = Registration::new(
            "V",
            Target::value(1u8),
            Some(RegistrationOptions::new().singleton()),
        )
        .unwrap_err();
        assert!(err.is_invalid());

        let err = Registration::new(
            "F",
            noop(),
            Some(RegistrationOptions::new().depends_on("")),
        )
        .unwrap_err();
        assert!(err.is_invalid());
    }

    #[test]
    fn test_arguments_positional_access() {
        let args = Arguments::new(
            "Ctrl",
            vec![
                ("Repo".to_string(), Arc::new(7u32) as Instance),
                ("Conn".to_string(), Arc::new("db".to_string()) as Instance),
            ],
        );

        assert_eq!(args.len(), 2);
        assert_eq!(args.name(1), Some("Conn"));
        assert_eq!(*args.get::<u32>(0).unwrap(), 7);
        assert_eq!(args.get::<String>(1).unwrap().as_str(), "db");

        let mismatch = args.get::<String>(0).unwrap_err();
        assert!(matches!(mismatch, ContainerError::TypeMismatch { ref name, .. } if name == "Repo"));
        assert!(args.get::<u32>(2).unwrap_err().is_invalid());
    }
}
