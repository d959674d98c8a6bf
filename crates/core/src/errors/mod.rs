pub mod container;

pub use container::{BoxError, ContainerError};
