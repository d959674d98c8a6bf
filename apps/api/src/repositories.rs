//! In-process document storage
//!
//! [`DocumentStore`] is opened once from the configured connection string and
//! owns one [`Collection`] per resource. A [`DocumentRepository`] pairs a
//! collection with the [`ModelSchema`] that every write must satisfy.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Document, ModelSchema, ValidationError, WriteMode};

/// Repository and store failures
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Unsupported connection string '{connection_string}': only memory:// stores are available")]
    UnsupportedStore { connection_string: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{field} '{value}' is already taken")]
    Conflict { field: String, value: String },

    #[error("Collection '{collection}' is unavailable after a panic while it was locked")]
    Poisoned { collection: String },
}

/// A window into a collection, in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub size: usize,
    pub start: usize,
}

impl Page {
    pub fn new(size: usize, start: usize) -> Self {
        Self { size, start }
    }

    pub fn has_previous(&self) -> bool {
        self.start > 0
    }

    pub fn has_next(&self, count: usize) -> bool {
        self.start.saturating_add(self.size) < count
    }

    pub fn previous(&self) -> Page {
        Page::new(self.size, self.start.saturating_sub(self.size))
    }

    pub fn next(&self) -> Page {
        Page::new(self.size, self.start.saturating_add(self.size))
    }
}

/// A document as kept by the store
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub fields: Document,
}

impl StoredDocument {
    /// Client-facing JSON, without hidden properties
    pub fn render(&self, schema: &ModelSchema) -> Value {
        let mut rendered = Document::new();
        rendered.insert("id".to_string(), Value::String(self.id.to_string()));
        for (key, value) in &self.fields {
            if !schema.is_hidden(key) {
                rendered.insert(key.clone(), value.clone());
            }
        }
        rendered.insert("createdAt".to_string(), Value::String(self.created_at.to_rfc3339()));
        rendered.insert("updatedAt".to_string(), Value::String(self.updated_at.to_rfc3339()));
        Value::Object(rendered)
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    documents: HashMap<Uuid, StoredDocument>,
    order: Vec<Uuid>,
}

/// Named set of documents shared by everything holding the same store
#[derive(Debug)]
pub struct Collection {
    name: String,
    state: RwLock<CollectionState>,
}

impl Collection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            state: RwLock::new(CollectionState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, CollectionState>, RepositoryError> {
        self.state.read().map_err(|_| RepositoryError::Poisoned {
            collection: self.name.clone(),
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, CollectionState>, RepositoryError> {
        self.state.write().map_err(|_| RepositoryError::Poisoned {
            collection: self.name.clone(),
        })
    }
}

/// The document database behind `ConnectionString`
#[derive(Debug)]
pub struct DocumentStore {
    database: String,
    collections: RwLock<HashMap<String, Arc<Collection>>>,
}

impl DocumentStore {
    /// Open a store from a `memory://<database>` connection string
    pub fn connect(connection_string: &str) -> Result<Self, RepositoryError> {
        let database = connection_string
            .strip_prefix("memory://")
            .map(|rest| rest.trim_matches('/'))
            .filter(|database| !database.is_empty())
            .ok_or_else(|| RepositoryError::UnsupportedStore {
                connection_string: connection_string.to_string(),
            })?;

        info!(database, "document store opened");
        Ok(Self {
            database: database.to_string(),
            collections: RwLock::new(HashMap::new()),
        })
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// The named collection, created on first use
    pub fn collection(&self, name: &str) -> Result<Arc<Collection>, RepositoryError> {
        let poisoned = || RepositoryError::Poisoned {
            collection: name.to_string(),
        };

        if let Some(collection) = self.collections.read().map_err(|_| poisoned())?.get(name) {
            return Ok(collection.clone());
        }

        let mut collections = self.collections.write().map_err(|_| poisoned())?;
        let collection = collections
            .entry(name.to_string())
            .or_insert_with(|| {
                debug!(database = %self.database, collection = name, "collection created");
                Arc::new(Collection::new(name))
            })
            .clone();
        Ok(collection)
    }
}

/// Schema-checked access to one collection
#[derive(Debug)]
pub struct DocumentRepository {
    schema: Arc<ModelSchema>,
    collection: Arc<Collection>,
}

impl DocumentRepository {
    pub fn new(
        store: &DocumentStore,
        collection: &str,
        schema: Arc<ModelSchema>,
    ) -> Result<Self, RepositoryError> {
        Ok(Self {
            schema,
            collection: store.collection(collection)?,
        })
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    /// One page of documents, oldest first
    pub fn get(&self, page: Page) -> Result<Vec<Value>, RepositoryError> {
        let state = self.collection.read()?;
        Ok(state
            .order
            .iter()
            .skip(page.start)
            .take(page.size)
            .filter_map(|id| state.documents.get(id))
            .map(|document| document.render(&self.schema))
            .collect())
    }

    pub fn get_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.collection.read()?.order.len())
    }

    pub fn get_by_id(&self, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        let state = self.collection.read()?;
        Ok(state
            .documents
            .get(&id)
            .map(|document| document.render(&self.schema)))
    }

    pub fn insert(&self, data: Document) -> Result<Value, RepositoryError> {
        self.schema.validate(&data, WriteMode::Full)?;

        let mut state = self.collection.write()?;
        self.ensure_unique(&state, &data, None)?;

        let now = Utc::now();
        let document = StoredDocument {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            fields: data,
        };
        let rendered = document.render(&self.schema);

        debug!(collection = self.collection.name(), id = %document.id, "document inserted");
        state.order.push(document.id);
        state.documents.insert(document.id, document);
        Ok(rendered)
    }

    /// Merge `data` into an existing document
    pub fn update(&self, id: Uuid, data: Document) -> Result<Option<Value>, RepositoryError> {
        self.schema.validate(&data, WriteMode::Partial)?;

        let mut state = self.collection.write()?;
        if !state.documents.contains_key(&id) {
            return Ok(None);
        }
        self.ensure_unique(&state, &data, Some(id))?;

        Ok(state.documents.get_mut(&id).map(|document| {
            for (key, value) in data {
                if value.is_null() {
                    document.fields.remove(&key);
                } else {
                    document.fields.insert(key, value);
                }
            }
            document.updated_at = Utc::now();
            debug!(collection = self.collection.name(), %id, "document updated");
            document.render(&self.schema)
        }))
    }

    /// Swap the properties of an existing document for `data`
    pub fn replace(&self, id: Uuid, data: Document) -> Result<Option<Value>, RepositoryError> {
        self.schema.validate(&data, WriteMode::Full)?;

        let mut state = self.collection.write()?;
        if !state.documents.contains_key(&id) {
            return Ok(None);
        }
        self.ensure_unique(&state, &data, Some(id))?;

        Ok(state.documents.get_mut(&id).map(|document| {
            document.fields = data;
            document.updated_at = Utc::now();
            debug!(collection = self.collection.name(), %id, "document replaced");
            document.render(&self.schema)
        }))
    }

    pub fn delete(&self, id: Uuid) -> Result<Option<Value>, RepositoryError> {
        let mut state = self.collection.write()?;
        let Some(document) = state.documents.remove(&id) else {
            return Ok(None);
        };
        state.order.retain(|entry| *entry != id);

        debug!(collection = self.collection.name(), %id, "document deleted");
        Ok(Some(document.render(&self.schema)))
    }

    fn ensure_unique(
        &self,
        state: &CollectionState,
        data: &Document,
        except: Option<Uuid>,
    ) -> Result<(), RepositoryError> {
        for field in self.schema.unique_fields() {
            let Some(value) = data.get(field.name).filter(|value| !value.is_null()) else {
                continue;
            };
            let taken = state.documents.values().any(|document| {
                Some(document.id) != except && document.fields.get(field.name) == Some(value)
            });
            if taken {
                return Err(RepositoryError::Conflict {
                    field: field.name.to_string(),
                    value: value.as_str().map_or_else(|| value.to_string(), str::to_string),
                });
            }
        }
        Ok(())
    }
}
