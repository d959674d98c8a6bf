use thiserror::Error;

/// Boxed error returned by component factories
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while registering or resolving components
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Component '{name}' is already registered")]
    DuplicateRegistration { name: String },

    #[error("Invalid registration '{name}': {reason}")]
    InvalidRegistration { name: String, reason: String },

    #[error("{}", unknown_message(.name, .required_by.as_deref()))]
    UnknownRegistration {
        name: String,
        required_by: Option<String>,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("Failed to construct component '{name}': {source}")]
    Construction {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Component '{name}' is not of type {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },
}

fn unknown_message(name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!(
            "Component '{}' is not registered (required by '{}')",
            name, parent
        ),
        None => format!("Component '{}' is not registered", name),
    }
}

impl ContainerError {
    /// Create a duplicate registration error
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateRegistration { name: name.into() }
    }

    /// Create an invalid registration error
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRegistration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create an unknown registration error
    pub fn unknown(name: impl Into<String>, required_by: Option<&str>) -> Self {
        Self::UnknownRegistration {
            name: name.into(),
            required_by: required_by.map(str::to_string),
        }
    }

    /// Create a construction error wrapping the factory's failure
    pub fn construction(name: impl Into<String>, source: BoxError) -> Self {
        Self::Construction {
            name: name.into(),
            source,
        }
    }

    /// Create a type mismatch error for `T`
    pub fn type_mismatch<T: ?Sized>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateRegistration { .. })
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::InvalidRegistration { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::UnknownRegistration { .. })
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }

    pub fn is_construction(&self) -> bool {
        matches!(self, Self::Construction { .. })
    }

    /// The cycle carried by a circular dependency error
    pub fn cycle(&self) -> Option<&[String]> {
        match self {
            Self::CircularDependency { cycle } => Some(cycle),
            _ => None,
        }
    }
}
