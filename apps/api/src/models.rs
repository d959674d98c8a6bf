//! Resource schemas
//!
//! A [`ModelSchema`] is registered in the container as a type token
//! (`TourModelType`, `UserModelType`, `WebhookModelType`) and handed to the
//! repository that stores documents of that shape. It decides which property
//! names a document may carry, which are required, and which are never
//! returned to clients.

use chrono::{DateTime, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// A stored or submitted JSON document
pub type Document = Map<String, Value>;

/// Property names managed by the store itself
pub const RESERVED_PROPERTIES: [&str; 5] = ["_id", "__v", "id", "createdAt", "updatedAt"];

/// A document failed schema validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    Date,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldKind::Text => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Integer => value.is_i64() || value.is_u64(),
            FieldKind::Boolean => value.is_boolean(),
            FieldKind::Date => value.as_str().is_some_and(|text| {
                DateTime::parse_from_rfc3339(text).is_ok()
                    || NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok()
            }),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "a string",
            FieldKind::Number => "a number",
            FieldKind::Integer => "an integer",
            FieldKind::Boolean => "true or false",
            FieldKind::Date => "a date",
        }
    }
}

/// Shape constraints for text fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    /// Starts with a letter, then letters, digits, `_` or `-`; 3 to 256 characters
    Username,
    /// Letters, digits, `_` or `-`; 1 to 300 characters
    Token,
    /// Absolute http(s) URL
    Url,
}

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{2,255}$").expect("valid username pattern"));
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,300}$").expect("valid token pattern"));

impl TextFormat {
    fn matches(&self, text: &str) -> bool {
        match self {
            TextFormat::Username => USERNAME_PATTERN.is_match(text),
            TextFormat::Token => TOKEN_PATTERN.is_match(text),
            TextFormat::Url => Url::parse(text).is_ok_and(|url| {
                matches!(url.scheme(), "http" | "https")
                    && url.host_str().is_some_and(|host| !host.is_empty())
            }),
        }
    }
}

/// One property of a model
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub unique: bool,
    /// Stored but never rendered
    pub hidden: bool,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub format: Option<TextFormat>,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            unique: false,
            hidden: false,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            format: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn length(mut self, min: usize, max: usize) -> Self {
        self.min_length = Some(min);
        self.max_length = Some(max);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn format(mut self, format: TextFormat) -> Self {
        self.format = Some(format);
        self
    }

    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        let invalid = |message: String| Err(ValidationError::new(self.name, message));

        if value.is_null() {
            if self.required {
                return invalid(format!("{} is required.", self.name));
            }
            return Ok(());
        }

        if !self.kind.accepts(value) {
            return invalid(format!("{} must be {}.", self.name, self.kind.describe()));
        }

        if let Some(number) = value.as_f64() {
            if self.min.is_some_and(|min| number < min) || self.max.is_some_and(|max| number > max) {
                return invalid(format!(
                    "{} must be between {} and {}.",
                    self.name,
                    self.min.map_or("-inf".to_string(), |min| min.to_string()),
                    self.max.map_or("inf".to_string(), |max| max.to_string()),
                ));
            }
        }

        if let Some(text) = value.as_str() {
            let length = text.chars().count();
            if let Some(min) = self.min_length.filter(|min| length < *min) {
                return invalid(format!("{} must be at least {} characters.", self.name, min));
            }
            if let Some(max) = self.max_length.filter(|max| length > *max) {
                return invalid(format!("{} must not contain more than {} characters.", self.name, max));
            }
            if self.format.is_some_and(|format| !format.matches(text)) {
                return invalid(format!("{} is not in a valid format.", self.name));
            }
        }

        Ok(())
    }
}

/// How much of a schema a write has to satisfy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert or replace: every required field present
    Full,
    /// Merge into an existing document
    Partial,
}

/// The property layout of one resource
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSchema {
    pub name: &'static str,
    fields: Vec<FieldSpec>,
}

impl ModelSchema {
    pub fn new(name: &'static str, fields: Vec<FieldSpec>) -> Self {
        Self { name, fields }
    }

    pub fn tour() -> Self {
        Self::new(
            "Tour",
            vec![
                FieldSpec::new("date", FieldKind::Date),
                FieldSpec::new("durationMin", FieldKind::Number).min(0.0),
                FieldSpec::new("distanceMeter", FieldKind::Number).min(0.0),
                FieldSpec::new("temperatureCelcius", FieldKind::Number),
                FieldSpec::new("wax", FieldKind::Text).max_length(50),
                FieldSpec::new("glide", FieldKind::Integer).range(1.0, 5.0),
                FieldSpec::new("grip", FieldKind::Integer).range(1.0, 5.0),
                FieldSpec::new("description", FieldKind::Text).max_length(500),
            ],
        )
    }

    pub fn user() -> Self {
        Self::new(
            "User",
            vec![
                FieldSpec::new("username", FieldKind::Text)
                    .required()
                    .unique()
                    .format(TextFormat::Username),
                FieldSpec::new("password", FieldKind::Text)
                    .required()
                    .hidden()
                    .length(10, 256),
            ],
        )
    }

    pub fn webhook() -> Self {
        Self::new(
            "Webhook",
            vec![
                FieldSpec::new("endpoint", FieldKind::Text)
                    .required()
                    .max_length(500)
                    .format(TextFormat::Url),
                FieldSpec::new("token", FieldKind::Text)
                    .required()
                    .format(TextFormat::Token),
                FieldSpec::new("user", FieldKind::Boolean).required(),
                FieldSpec::new("tour", FieldKind::Boolean).required(),
                FieldSpec::new("owner", FieldKind::Text).required(),
            ],
        )
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Property names a client may write
    pub fn allowed_property_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields
            .iter()
            .map(|field| field.name)
            .filter(|name| !RESERVED_PROPERTIES.contains(name))
    }

    pub fn is_hidden(&self, name: &str) -> bool {
        self.field(name).is_some_and(|field| field.hidden)
    }

    pub fn unique_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|field| field.unique)
    }

    /// Check a submitted document against the schema
    pub fn validate(&self, document: &Document, mode: WriteMode) -> Result<(), ValidationError> {
        for (key, value) in document {
            let field = self
                .field(key)
                .filter(|_| !RESERVED_PROPERTIES.contains(&key.as_str()))
                .ok_or_else(|| {
                    ValidationError::new(key, format!("'{}' is not a valid property name.", key))
                })?;
            field.check(value)?;
        }

        if mode == WriteMode::Full {
            if let Some(missing) = self
                .fields
                .iter()
                .find(|field| field.required && !document.contains_key(field.name))
            {
                return Err(ValidationError::new(
                    missing.name,
                    format!("{} is required.", missing.name),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_allowed_property_names() {
        let names: Vec<_> = ModelSchema::user().allowed_property_names().collect();
        assert_eq!(names, vec!["username", "password"]);
        assert!(ModelSchema::user().is_hidden("password"));
        assert!(!ModelSchema::tour().is_hidden("wax"));
    }

    #[test]
    fn test_unknown_and_reserved_properties_rejected() {
        let schema = ModelSchema::tour();

        let err = schema
            .validate(&doc(json!({ "skis": "classic" })), WriteMode::Partial)
            .unwrap_err();
        assert_eq!(err.field, "skis");
        assert_eq!(err.message, "'skis' is not a valid property name.");

        let err = schema
            .validate(&doc(json!({ "createdAt": "2024-01-01" })), WriteMode::Partial)
            .unwrap_err();
        assert_eq!(err.field, "createdAt");
    }

    #[test]
    fn test_tour_constraints() {
        let schema = ModelSchema::tour();
        let valid = doc(json!({
            "date": "2024-02-11",
            "durationMin": 95,
            "distanceMeter": 21000.5,
            "temperatureCelcius": -8,
            "wax": "Swix V40",
            "glide": 4,
            "grip": 5,
            "description": "Fast tracks"
        }));
        assert!(schema.validate(&valid, WriteMode::Full).is_ok());

        for invalid in [
            json!({ "glide": 6 }),
            json!({ "grip": 2.5 }),
            json!({ "durationMin": -1 }),
            json!({ "date": "yesterday" }),
            json!({ "wax": "x".repeat(51) }),
        ] {
            assert!(schema.validate(&doc(invalid), WriteMode::Partial).is_err());
        }
    }

    #[test]
    fn test_required_fields_only_checked_on_full_writes() {
        let schema = ModelSchema::user();
        let partial = doc(json!({ "username": "nordic_skier" }));

        assert!(schema.validate(&partial, WriteMode::Partial).is_ok());
        let err = schema.validate(&partial, WriteMode::Full).unwrap_err();
        assert_eq!(err.field, "password");

        let err = schema
            .validate(&doc(json!({ "username": null })), WriteMode::Partial)
            .unwrap_err();
        assert_eq!(err.message, "username is required.");
    }

    #[test]
    fn test_text_formats() {
        assert!(TextFormat::Username.matches("skier_01"));
        assert!(!TextFormat::Username.matches("1skier"));
        assert!(!TextFormat::Username.matches("ab"));
        assert!(TextFormat::Token.matches("abc-123_XYZ"));
        assert!(!TextFormat::Token.matches("has space"));
        assert!(TextFormat::Url.matches("https://hooks.example.com/in"));
        assert!(!TextFormat::Url.matches("ftp://example.com"));
        assert!(!TextFormat::Url.matches("https://"));
        assert!(!TextFormat::Url.matches("hooks.example.com"));
    }
}
