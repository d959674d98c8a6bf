use serde::{Deserialize, Serialize};

use crate::container::lifetime::{Lifetime, SingletonState};

/// Point-in-time description of a container, for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    pub components: usize,
    pub singletons_built: usize,
    pub registrations: Vec<RegistrationSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationSnapshot {
    pub name: String,
    pub lifetime: Lifetime,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<SingletonState>,
}

impl ContainerSnapshot {
    pub fn registration(&self, name: &str) -> Option<&RegistrationSnapshot> {
        self.registrations.iter().find(|entry| entry.name == name)
    }

    /// Render the dependency graph in Graphviz DOT format
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph container {\n    rankdir=LR;\n");
        for entry in &self.registrations {
            let shape = match entry.lifetime {
                Lifetime::Value | Lifetime::Type => "note",
                Lifetime::Transient => "ellipse",
                Lifetime::Singleton => "box",
            };
            let name = dot_escape(&entry.name);
            dot.push_str(&format!(
                "    \"{}\" [shape={}, label=\"{}\\n({})\"];\n",
                name, shape, name, entry.lifetime
            ));
            for dependency in &entry.dependencies {
                dot.push_str(&format!(
                    "    \"{}\" -> \"{}\";\n",
                    name,
                    dot_escape(dependency)
                ));
            }
        }
        dot.push_str("}\n");
        dot
    }
}

/// Quote-safe text for a DOT string literal
fn dot_escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}
