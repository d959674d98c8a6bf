use std::collections::HashMap;

use crate::container::registration::Registration;
use crate::errors::ContainerError;

/// Name-keyed store of registrations, kept in registration order
#[derive(Debug, Default)]
pub struct RegistrationStore {
    entries: HashMap<String, Registration>,
    order: Vec<String>,
}

impl RegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a registration; names are unique
    pub fn insert(&mut self, registration: Registration) -> Result<(), ContainerError> {
        let name = registration.name().to_string();
        if self.entries.contains_key(&name) {
            return Err(ContainerError::duplicate(name));
        }

        self.order.push(name.clone());
        self.entries.insert(name, registration);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Registration> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registrations in the order they were added
    pub fn iter(&self) -> impl Iterator<Item = &Registration> {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    /// Registered names in the order they were added
    pub fn names(&self) -> &[String] {
        &self.order
    }
}
