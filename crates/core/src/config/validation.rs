use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Name of the offending field, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingRequired { field, .. } | Self::InvalidValue { field, .. } => Some(field),
            Self::ValidationFailed { .. } => None,
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate a configuration value of `field`
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError>;
}

/// Port number validator
pub struct PortValidator {
    pub min: u16,
    pub max: u16,
}

impl Default for PortValidator {
    fn default() -> Self {
        Self { min: 1, max: 65535 }
    }
}

impl ConfigValidator<u16> for PortValidator {
    fn validate(&self, field: &str, value: &u16) -> Result<(), ConfigError> {
        if *value < self.min || *value > self.max {
            return Err(ConfigError::invalid_value(
                field,
                value.to_string(),
                format!("port between {} and {}", self.min, self.max),
            ));
        }
        Ok(())
    }
}

/// Scheme-and-host URL check, enough for connection strings and base URLs
pub struct UrlValidator {
    pub schemes: Vec<String>,
}

impl UrlValidator {
    pub fn http() -> Self {
        Self {
            schemes: vec!["http".to_string(), "https".to_string()],
        }
    }

    pub fn with_schemes<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemes: schemes.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigValidator<str> for UrlValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(value).map_err(|e| {
            ConfigError::invalid_value(field, value, format!("valid URL ({})", e))
        })?;

        if !self.schemes.iter().any(|allowed| allowed == parsed.scheme()) {
            return Err(ConfigError::invalid_value(
                field,
                value,
                format!("URL with scheme: {}", self.schemes.join(", ")),
            ));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(ConfigError::invalid_value(field, value, "URL with host"));
        }

        Ok(())
    }
}
