//! Component registration
//!
//! Everything the HTTP layer uses is registered here by name, then the builder
//! is validated and frozen. Routes only ever see the resulting [`Container`].

use std::sync::Arc;

use skitrack_core::{AppConfig, Container, ContainerBuilder, ContainerError};
use tracing::info;

use crate::controllers::{HomeController, ResourceController};
use crate::links::LinkProvider;
use crate::models::ModelSchema;
use crate::repositories::{DocumentRepository, DocumentStore};
use crate::services::DocumentService;
use crate::validators::InputValidator;

pub const CONNECTION_STRING: &str = "ConnectionString";
pub const BASE_URL: &str = "BaseUrl";
pub const DOCUMENT_STORE: &str = "DocumentStoreSingleton";
pub const LINK_PROVIDER: &str = "LinkProviderSingleton";
pub const INPUT_VALIDATOR: &str = "InputValidatorSingleton";
pub const HOME_CONTROLLER: &str = "HomeController";

/// The registration names of one REST resource
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    /// Route segment and store collection
    pub collection: &'static str,
    pub model_type: &'static str,
    pub repository: &'static str,
    pub service: &'static str,
    pub controller: &'static str,
    pub schema: fn() -> ModelSchema,
}

pub const TOURS: Resource = Resource {
    collection: "tours",
    model_type: "TourModelType",
    repository: "TourRepositorySingleton",
    service: "TourServiceSingleton",
    controller: "TourController",
    schema: ModelSchema::tour,
};

pub const USERS: Resource = Resource {
    collection: "users",
    model_type: "UserModelType",
    repository: "UserRepositorySingleton",
    service: "UserServiceSingleton",
    controller: "UserController",
    schema: ModelSchema::user,
};

pub const WEBHOOKS: Resource = Resource {
    collection: "webhooks",
    model_type: "WebhookModelType",
    repository: "WebhookRepositorySingleton",
    service: "WebhookServiceSingleton",
    controller: "WebhookController",
    schema: ModelSchema::webhook,
};

pub const RESOURCES: [Resource; 3] = [TOURS, USERS, WEBHOOKS];

/// Register the shared infrastructure and every resource
pub fn register_components(
    builder: ContainerBuilder,
    config: &AppConfig,
) -> Result<ContainerBuilder, ContainerError> {
    let builder = builder
        .add_value(CONNECTION_STRING, config.connection_string.clone())?
        .add_value(BASE_URL, config.public_base_url())?
        .add_singleton(DOCUMENT_STORE, [CONNECTION_STRING], |args| {
            Ok(DocumentStore::connect(&args.get::<String>(0)?)?)
        })?
        .add_singleton(LINK_PROVIDER, [BASE_URL], |args| {
            Ok(LinkProvider::new(args.get::<String>(0)?.as_str()))
        })?
        .add_singleton(INPUT_VALIDATOR, Vec::<String>::new(), |_| {
            Ok(InputValidator::new())
        })?
        .add_transient(HOME_CONTROLLER, [LINK_PROVIDER], |args| {
            let collections = RESOURCES.iter().map(|resource| resource.collection).collect();
            Ok(HomeController::new(args.get(0)?, collections))
        })?;

    RESOURCES
        .iter()
        .try_fold(builder, |builder, resource| register_resource(builder, resource))
}

/// Model type, repository, service and controller of one resource
pub fn register_resource(
    builder: ContainerBuilder,
    resource: &Resource,
) -> Result<ContainerBuilder, ContainerError> {
    let collection = resource.collection;

    builder
        .add_type(resource.model_type, (resource.schema)())?
        .add_singleton(
            resource.repository,
            [DOCUMENT_STORE, resource.model_type],
            move |args| {
                let store = args.get::<DocumentStore>(0)?;
                let schema = args.get::<ModelSchema>(1)?;
                Ok(DocumentRepository::new(&store, collection, schema)?)
            },
        )?
        .add_singleton(resource.service, [resource.repository], |args| {
            Ok(DocumentService::new(args.get(0)?))
        })?
        .add_transient(
            resource.controller,
            [resource.service, LINK_PROVIDER, INPUT_VALIDATOR],
            |args| {
                Ok(ResourceController::new(
                    args.get(0)?,
                    args.get(1)?,
                    args.get(2)?,
                ))
            },
        )
}

/// Register, validate and freeze
pub fn container(config: &AppConfig) -> Result<Container, ContainerError> {
    let container = register_components(Container::builder(), config)?.build()?;
    info!(components = container.len(), "container ready");
    Ok(container)
}

/// A frozen container ready to be shared with the router
pub fn shared_container(config: &AppConfig) -> Result<Arc<Container>, ContainerError> {
    container(config).map(Arc::new)
}
