//! # Structured Logging
//!
//! `tracing-subscriber` setup for the API: an `EnvFilter` over the skitrack
//! crates plus a text, pretty or JSON formatting layer.

use std::io;

use serde_json::{json, Value};
use skitrack_core::{AppConfig, LogFormat};
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration for the API process
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the skitrack crates (e.g. "info", "debug")
    pub level: String,
    pub format: LogFormat,
    /// Include file and line number information
    pub include_location: bool,
    /// Custom fields reported once at startup
    pub global_fields: serde_json::Map<String, Value>,
    /// Full filter directive; overrides `level` when set
    pub env_filter: Option<String>,
    pub service_name: Option<String>,
    pub service_version: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            include_location: false,
            global_fields: serde_json::Map::new(),
            env_filter: None,
            service_name: None,
            service_version: None,
        }
    }
}

impl LoggingConfig {
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            env_filter: Some("skitrack_api=info,skitrack_core=info,tower_http=warn".to_string()),
            ..Self::default()
        }
        .with_global_field("env", "production")
    }

    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            include_location: true,
            env_filter: Some(
                "skitrack_api=debug,skitrack_core=debug,tower_http=debug".to_string(),
            ),
            ..Self::default()
        }
        .with_global_field("env", "development")
    }

    /// Minimal output for tests
    pub fn test() -> Self {
        Self {
            level: "error".to_string(),
            env_filter: Some("skitrack_api=error,skitrack_core=error".to_string()),
            ..Self::default()
        }
        .with_global_field("env", "test")
    }

    /// Preset for the configured environment, then `LOG_LEVEL`/`LOG_FORMAT` on top
    pub fn from_app_config(config: &AppConfig) -> Self {
        let preset = if config.environment.is_production() {
            Self::production()
        } else if config.environment.is_testing() {
            Self::test()
        } else {
            Self::development()
        };

        Self {
            level: config.log_level.clone(),
            format: config.log_format,
            env_filter: Some(format!(
                "skitrack_api={level},skitrack_core={level},tower_http={level}",
                level = config.log_level
            )),
            ..preset
        }
    }

    pub fn with_global_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.global_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_service(mut self, name: &str, version: &str) -> Self {
        self.service_name = Some(name.to_string());
        self.service_version = Some(version.to_string());
        self
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// `RUST_LOG` wins over the configured directive
    pub fn filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        let directive = self.env_filter.as_deref().unwrap_or(&self.level);
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(directive))
    }
}

/// Install the global subscriber; fails if one is already installed
pub fn init_logging(config: LoggingConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = config.filter()?;
    let location = config.include_location;

    match config.format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                Layer::new()
                    .with_writer(io::stdout)
                    .with_file(location)
                    .with_line_number(location)
                    .json(),
            )
            .try_init()?,
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                Layer::new()
                    .with_writer(io::stdout)
                    .with_file(location)
                    .with_line_number(location)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                Layer::new()
                    .with_writer(io::stdout)
                    .with_file(location)
                    .with_line_number(location),
            )
            .try_init()?,
    }

    let mut init_msg = json!({
        "message": "Structured logging initialized",
        "level": config.level,
        "format": format!("{:?}", config.format).to_lowercase(),
    });
    if let Some(name) = config.service_name {
        init_msg["service_name"] = json!(name);
    }
    if let Some(version) = config.service_version {
        init_msg["service_version"] = json!(version);
    }
    for (key, value) in config.global_fields {
        init_msg[key] = value;
    }
    tracing::info!(target: "skitrack::logging", "{}", init_msg);

    Ok(())
}

pub fn log_startup_info(service_name: &str, service_version: &str, address: &str) {
    let startup_info = json!({
        "event": "application_startup",
        "service": service_name,
        "version": service_version,
        "address": address,
        "pid": std::process::id(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "os": std::env::consts::OS,
        "arch": std::env::consts::ARCH,
    });

    tracing::info!(target: "skitrack::startup", "{}", startup_info);
}

pub fn log_shutdown_info(service_name: &str) {
    let shutdown_info = json!({
        "event": "application_shutdown",
        "service": service_name,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    tracing::info!(target: "skitrack::shutdown", "{}", shutdown_info);
}
