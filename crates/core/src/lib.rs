//! Core of the skitrack API: a name-based dependency resolution container and
//! the application configuration it is bootstrapped from.
//!
//! Components are registered by name on a [`ContainerBuilder`] during
//! bootstrap, then the builder is frozen into an immutable [`Container`]
//! that resolves them (recursively, positionally injecting declared
//! dependencies) while serving.

pub mod config;
pub mod container;
pub mod errors;

pub use config::{AppConfig, AppConfigTrait, ConfigError, ConfigSource, Environment, LogFormat};
pub use container::{
    Arguments, Container, ContainerBuilder, ContainerSnapshot, Factory, Instance, Lifetime,
    RegistrationOptions, SingletonState, Target,
};
pub use errors::{BoxError, ContainerError};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get framework version
pub fn version() -> &'static str {
    VERSION
}
