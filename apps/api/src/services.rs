use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::models::Document;
use crate::repositories::{DocumentRepository, Page, RepositoryError};

/// Resource operations on top of a repository.
///
/// One singleton per resource (`TourServiceSingleton`, ...), shared by every
/// controller built for that resource.
#[derive(Debug)]
pub struct DocumentService {
    repository: Arc<DocumentRepository>,
}

impl DocumentService {
    pub fn new(repository: Arc<DocumentRepository>) -> Self {
        Self { repository }
    }

    /// Path segment of the resource collection, e.g. `tours`
    pub fn collection(&self) -> &str {
        self.repository.collection_name()
    }

    pub fn get(&self, page: Page) -> Result<Vec<Value>, RepositoryError> {
        self.repository.get(page)
    }

    pub fn get_count(&self) -> Result<usize, RepositoryError> {
        self.repository.get_count()
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        self.repository.get_by_id(id)
    }

    pub fn insert(&self, data: Document) -> Result<Value, RepositoryError> {
        self.repository.insert(data)
    }

    pub fn update(&self, id: Uuid, data: Document) -> Result<Option<Value>, RepositoryError> {
        self.repository.update(id, data)
    }

    pub fn replace(&self, id: Uuid, data: Document) -> Result<Option<Value>, RepositoryError> {
        self.repository.replace(id, data)
    }

    pub fn delete(&self, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        self.repository.delete(id)
    }
}
