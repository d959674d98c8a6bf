#[allow(clippy::module_inception)]
pub mod container;
pub mod builder;
pub mod cache;
pub mod lifetime;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod snapshot;


pub use container::Container;
pub use builder::ContainerBuilder;
pub use cache::SingletonCache;
pub use lifetime::{Lifetime, SingletonState};
pub use registration::{Arguments, Factory, Instance, Registration, RegistrationOptions, Target};
pub use registry::RegistrationStore;
pub use resolver::{DependencyGraph, ResolutionPath};
pub use snapshot::{ContainerSnapshot, RegistrationSnapshot};
