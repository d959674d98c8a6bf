use crate::config::{ConfigError, ConfigSource, ConfigValidator, PortValidator, UrlValidator};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

const ENV_ENVIRONMENT: &str = "APP_ENV";
const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";
const ENV_CONNECTION_STRING: &str = "DB_CONNECTION_STRING";
const ENV_BASE_URL: &str = "BASE_URL";
const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Connection string schemes the document store can open
pub const CONNECTION_SCHEMES: [&str; 1] = ["memory"];

/// Configuration trait for application configuration
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Environment enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(LogFormat::Text),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::invalid_value("log_format", s, "text, pretty, or json")),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub host: String,
    pub port: u16,
    /// Document store connection string, registered as `ConnectionString`
    pub connection_string: String,
    /// Public base URL used for hypermedia links; derived from host and port when unset
    pub base_url: Option<String>,
    pub log_level: String,
    pub log_format: LogFormat,
    sources: HashMap<String, ConfigSource>,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            environment: Environment::Development,
            host: "127.0.0.1".to_string(),
            port: 3000,
            connection_string: "memory://skitrack".to_string(),
            base_url: None,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            sources: HashMap::new(),
        }
    }

    /// Create configuration for development
    pub fn development() -> Self {
        Self {
            log_level: "debug".to_string(),
            log_format: LogFormat::Pretty,
            ..Self::new()
        }
    }

    /// Create configuration for testing
    pub fn testing() -> Self {
        Self {
            environment: Environment::Testing,
            port: 0,
            connection_string: "memory://skitrack-test".to_string(),
            log_level: "warn".to_string(),
            ..Self::new()
        }
    }

    /// Create configuration for production
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_format: LogFormat::Json,
            ..Self::new()
        }
    }

    /// Load from an arbitrary variable lookup; `from_env` uses the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) => value.parse()?,
            None => Environment::Development,
        };
        let mut config = match environment {
            Environment::Development => Self::development(),
            Environment::Testing => Self::testing(),
            Environment::Production => Self::production(),
        };
        config.track(ENV_ENVIRONMENT, "environment", &lookup, &config.environment.to_string());

        if let Some(host) = lookup(ENV_HOST) {
            config.host = host;
        }
        config.track(ENV_HOST, "host", &lookup, &config.host.clone());

        if let Some(port) = lookup(ENV_PORT) {
            config.port = port
                .parse()
                .map_err(|_| ConfigError::invalid_value("port", &port, "valid port number (0-65535)"))?;
        }
        config.track(ENV_PORT, "port", &lookup, &config.port.to_string());

        if let Some(connection_string) = lookup(ENV_CONNECTION_STRING) {
            config.connection_string = connection_string;
        }
        config.track(
            ENV_CONNECTION_STRING,
            "connection_string",
            &lookup,
            &config.connection_string.clone(),
        );

        config.base_url = lookup(ENV_BASE_URL).or(config.base_url);
        config.track(ENV_BASE_URL, "base_url", &lookup, "derived from host and port");

        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level.to_lowercase();
        }
        config.track(ENV_LOG_LEVEL, "log_level", &lookup, &config.log_level.clone());

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            config.log_format = format.parse()?;
        }
        config.track(ENV_LOG_FORMAT, "log_format", &lookup, &format!("{:?}", config.log_format));

        config.validate()?;
        Ok(config)
    }

    fn track<F>(&mut self, var: &str, field: &str, lookup: &F, default: &str)
    where
        F: Fn(&str) -> Option<String>,
    {
        let source = if lookup(var).is_some() {
            ConfigSource::EnvVar(var.to_string())
        } else {
            ConfigSource::Default(default.to_string())
        };
        self.sources.insert(field.to_string(), source);
    }

    /// Get the bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL for links, without a trailing slash
    pub fn public_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}", self.bind_address()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfigTrait for AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // Port 0 asks the OS for a free port, which only makes sense in tests.
        if !self.environment.is_testing() {
            PortValidator::default().validate("port", &self.port)?;
        }

        if self.connection_string.trim().is_empty() {
            return Err(ConfigError::missing_required(
                "connection_string",
                format!("{} must not be empty", ENV_CONNECTION_STRING),
            ));
        }
        UrlValidator::with_schemes(CONNECTION_SCHEMES)
            .validate("connection_string", &self.connection_string)?;

        if let Some(base_url) = &self.base_url {
            UrlValidator::http().validate("base_url", base_url)?;
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(ConfigError::invalid_value(
                "log_level",
                &self.log_level,
                format!("one of: {}", valid_levels.join(", ")),
            ));
        }

        Ok(())
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        self.sources.clone()
    }
}
