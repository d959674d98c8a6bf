use serde::{Deserialize, Serialize};

use crate::errors::ContainerError;

/// Lifetime policy of a registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifetime {
    /// Literal value returned as registered
    Value,
    /// Type token handed through unchanged, never instantiated
    Type,
    /// New instance built on every resolution
    Transient,
    /// Single instance built on first resolution and shared afterwards
    Singleton,
}

impl Lifetime {
    /// Check if the lifetime is singleton
    pub fn is_singleton(&self) -> bool {
        matches!(self, Lifetime::Singleton)
    }

    /// Check if the lifetime is transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Lifetime::Transient)
    }

    /// Value and type registrations are returned verbatim
    pub fn is_verbatim(&self) -> bool {
        matches!(self, Lifetime::Value | Lifetime::Type)
    }

    /// Get the lifetime name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifetime::Value => "value",
            Lifetime::Type => "type",
            Lifetime::Transient => "transient",
            Lifetime::Singleton => "singleton",
        }
    }
}

impl std::fmt::Display for Lifetime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Lifetime {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "value" => Ok(Lifetime::Value),
            "type" => Ok(Lifetime::Type),
            "transient" => Ok(Lifetime::Transient),
            "singleton" => Ok(Lifetime::Singleton),
            _ => Err(ContainerError::invalid(
                s,
                "expected one of value, type, transient, singleton",
            )),
        }
    }
}

/// Build state of a singleton registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SingletonState {
    Unbuilt,
    Built,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_from_str() {
        assert_eq!("value".parse::<Lifetime>().unwrap(), Lifetime::Value);
        assert_eq!("Type".parse::<Lifetime>().unwrap(), Lifetime::Type);
        assert_eq!("transient".parse::<Lifetime>().unwrap(), Lifetime::Transient);
        assert_eq!("SINGLETON".parse::<Lifetime>().unwrap(), Lifetime::Singleton);

        assert!("scoped".parse::<Lifetime>().is_err());
    }

    #[test]
    fn test_lifetime_display() {
        assert_eq!(format!("{}", Lifetime::Value), "value");
        assert_eq!(format!("{}", Lifetime::Singleton), "singleton");
        assert!(Lifetime::Type.is_verbatim());
        assert!(!Lifetime::Transient.is_verbatim());
    }
}
