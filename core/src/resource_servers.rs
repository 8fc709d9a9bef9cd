//! CRUD over `/resource-servers/:id`.

use std::sync::Arc;

use serde_json::Value;
use tracing::instrument;

use crate::config::ManagerOptions;
use crate::error::{ApiError, ConfigError};
use crate::rest::{Params, RestClient};
use crate::transport::Transport;
use crate::types::{CreateResourceServer, ResourceServer, UpdateResourceServer};

/// Manager for the resource-servers endpoint.
///
/// Payloads are not validated locally; the server owns those rules.
#[derive(Debug)]
pub struct ResourceServersManager<T> {
    resource: RestClient<T>,
}

impl<T> Clone for ResourceServersManager<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Transport> ResourceServersManager<T> {
    /// Validate `options` and bind `{base_url}/resource-servers/:id`.
    ///
    /// No request is sent.
    pub fn new(options: &ManagerOptions, transport: Arc<T>) -> Result<Self, ConfigError> {
        let resource = RestClient::for_manager(options, "resource-servers/:id", transport)?;
        Ok(Self { resource })
    }

    pub fn resource(&self) -> &RestClient<T> {
        &self.resource
    }

    /// List resource servers, passing `params` through as query filters.
    #[instrument(skip(self))]
    pub async fn get_all(&self, params: &Params) -> Result<Vec<ResourceServer>, ApiError> {
        self.resource.get_all(params).await
    }

    #[instrument(skip_all, fields(identifier = %data.identifier))]
    pub async fn create(&self, data: &CreateResourceServer) -> Result<ResourceServer, ApiError> {
        self.resource.create(&Params::new(), data).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<ResourceServer, ApiError> {
        self.resource.get(&id_params(id)).await
    }

    #[instrument(skip(self, data))]
    pub async fn update(
        &self,
        id: &str,
        data: &UpdateResourceServer,
    ) -> Result<ResourceServer, ApiError> {
        self.resource.patch(&id_params(id), data).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.resource.delete(&id_params(id)).await
    }
}

#[cfg(feature = "ureq")]
impl ResourceServersManager<crate::transport::UreqTransport> {
    /// Build a manager that talks HTTP through ureq.
    pub fn with_ureq(options: &ManagerOptions) -> Result<Self, ConfigError> {
        Self::new(options, Arc::new(crate::transport::UreqTransport::new()))
    }
}

fn id_params(id: &str) -> Params {
    let mut params = Params::new();
    params.insert("id".to_string(), Value::String(id.to_string()));
    params
}

/// Parameters matching any of the given identifiers, for `get_all`.
pub fn identifiers_filter(identifiers: &[&str]) -> Params {
    let mut params = Params::new();
    let list = identifiers
        .iter()
        .map(|identifier| Value::String(identifier.to_string()))
        .collect();
    params.insert("identifiers".to_string(), Value::Array(list));
    params
}
