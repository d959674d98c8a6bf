use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::Document;
use crate::repositories::Page;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Raw paging query parameters, validated by [`InputValidator::page`]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_size: Option<String>,
    pub page_start_index: Option<String>,
}

/// Request input checks shared by all controllers
#[derive(Debug, Clone)]
pub struct InputValidator {
    default_page_size: usize,
    max_page_size: usize,
}

impl Default for InputValidator {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl InputValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, query: &PageQuery) -> Result<Page, ApiError> {
        let size = match query.page_size.as_deref() {
            Some(raw) => self.validate_page_size(raw)?,
            None => self.default_page_size,
        };
        let start = match query.page_start_index.as_deref() {
            Some(raw) => self.validate_page_start_index(raw)?,
            None => 0,
        };
        Ok(Page::new(size, start))
    }

    pub fn validate_page_size(&self, raw: &str) -> Result<usize, ApiError> {
        match raw.trim().parse::<usize>() {
            Ok(size) if size > 0 => Ok(size.min(self.max_page_size)),
            _ => Err(ApiError::bad_request("Page size must be a positive integer")),
        }
    }

    pub fn validate_page_start_index(&self, raw: &str) -> Result<usize, ApiError> {
        raw.trim()
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request("Page start index must be a positive integer or 0"))
    }

    /// Path ids that are not UUIDs cannot name a document
    pub fn document_id(&self, raw: &str) -> Result<Uuid, ApiError> {
        raw.parse().map_err(|_| ApiError::NotFound)
    }

    /// Request bodies must be JSON objects
    pub fn document(&self, body: Value) -> Result<Document, ApiError> {
        match body {
            Value::Object(document) => Ok(document),
            _ => Err(ApiError::bad_request("Request body must be a JSON object")),
        }
    }
}
