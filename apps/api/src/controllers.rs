//! Request handling for the API resources
//!
//! Controllers are transient: the router resolves a fresh one from the
//! container for every request. They hold only shared singletons, so building
//! one is a handful of `Arc` clones.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::links::LinkProvider;
use crate::services::DocumentService;
use crate::validators::{InputValidator, PageQuery};

/// Name and version reported by the API index
pub const API_NAME: &str = "Ski Tour Log";
pub const API_VERSION: u32 = 1;

/// A created document and where to find it
#[derive(Debug)]
pub struct Created {
    pub location: String,
    pub body: Value,
}

/// CRUD over one resource collection
#[derive(Debug)]
pub struct ResourceController {
    service: Arc<DocumentService>,
    links: Arc<LinkProvider>,
    validator: Arc<InputValidator>,
}

impl ResourceController {
    pub fn new(
        service: Arc<DocumentService>,
        links: Arc<LinkProvider>,
        validator: Arc<InputValidator>,
    ) -> Self {
        Self {
            service,
            links,
            validator,
        }
    }

    fn collection(&self) -> &str {
        self.service.collection()
    }

    pub fn find_all(&self, query: &PageQuery) -> ApiResult<Value> {
        let page = self.validator.page(query)?;
        let count = self.service.get_count()?;
        let documents = self.service.get(page)?;

        Ok(json!({
            "data": self.links.populate(self.collection(), documents),
            "count": count,
            "links": self.links.collection_links(self.collection(), page, count),
        }))
    }

    pub fn find(&self, id: &str) -> ApiResult<Value> {
        let id = self.validator.document_id(id)?;
        let document = self.service.get_by_id(id)?.ok_or(ApiError::NotFound)?;
        Ok(self.with_links(document))
    }

    pub fn create(&self, body: Value) -> ApiResult<Created> {
        let data = self.validator.document(body)?;
        let document = self.service.insert(data)?;

        let id = document["id"].as_str().unwrap_or_default().to_string();
        debug!(collection = self.collection(), %id, "created");

        Ok(Created {
            location: self.links.document_url(self.collection(), &id),
            body: self.with_links(document),
        })
    }

    pub fn partially_update(&self, id: &str, body: Value) -> ApiResult<Value> {
        let id = self.validator.document_id(id)?;
        let data = self.validator.document(body)?;
        let document = self.service.update(id, data)?.ok_or(ApiError::NotFound)?;
        Ok(self.with_links(document))
    }

    pub fn update(&self, id: &str, body: Value) -> ApiResult<Value> {
        let id = self.validator.document_id(id)?;
        let data = self.validator.document(body)?;
        let document = self.service.replace(id, data)?.ok_or(ApiError::NotFound)?;
        Ok(self.with_links(document))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let id = self.validator.document_id(id)?;
        self.service.delete(id)?.ok_or(ApiError::NotFound)?;
        debug!(collection = self.collection(), %id, "deleted");
        Ok(())
    }

    fn with_links(&self, document: Value) -> Value {
        let id = document["id"].as_str().unwrap_or_default();
        let links = self.links.document_links(self.collection(), id);
        json!({ "data": document, "links": links })
    }
}

/// The API index
#[derive(Debug)]
pub struct HomeController {
    links: Arc<LinkProvider>,
    collections: Vec<&'static str>,
}

impl HomeController {
    pub fn new(links: Arc<LinkProvider>, collections: Vec<&'static str>) -> Self {
        Self { links, collections }
    }

    pub fn index(&self) -> Value {
        json!({
            "name": API_NAME,
            "version": API_VERSION,
            "links": self.links.home_links(&self.collections),
        })
    }
}
