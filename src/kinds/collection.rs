//! Collection resource kind.
//!
//! Collections are scoped to one database. Their statistics carry the
//! namespace under `ns`, prefixed by the database name (`shop.orders`); the
//! normalized name keeps everything after the first dot, so collection names
//! that themselves contain dots (`system.users`) survive intact.

use crate::adapter::{ResourceAdapter, ResourceHandle, with_name};
use crate::backend::Backend;
use crate::error::{ServiceError, ServiceResult};
use crate::query::Descriptor;
use crate::service::{ResourceService, ServiceOptions};
use log::{debug, trace};
use serde_json::Value;

const KIND: &str = "collection";
const IDENTITY_KEY: &str = "ns";

/// Handle to a live collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionHandle {
    name: String,
}

impl ResourceHandle for CollectionHandle {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapter exposing the collections of one database.
#[derive(Debug, Clone)]
pub struct CollectionAdapter<B: Backend> {
    backend: B,
    database: String,
}

impl<B: Backend> CollectionAdapter<B> {
    pub fn new(backend: B, database: impl Into<String>) -> Self {
        Self {
            backend,
            database: database.into(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

impl<B: Backend> ResourceAdapter for CollectionAdapter<B> {
    type Handle = CollectionHandle;

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn create_one(&self, name: &str, options: Descriptor) -> ServiceResult<Descriptor> {
        self.backend
            .create_collection(&self.database, name, options)
            .await?;
        Ok(self.backend.collection_stats(&self.database, name).await?)
    }

    async fn get_one(&self, name: &str) -> ServiceResult<Option<CollectionHandle>> {
        let names = self.backend.list_collections(&self.database).await?;
        Ok(names
            .into_iter()
            .find(|candidate| candidate == name)
            .map(|name| CollectionHandle { name }))
    }

    async fn list_all(&self) -> ServiceResult<Vec<CollectionHandle>> {
        let names = self.backend.list_collections(&self.database).await?;
        trace!("Listed {} collections in {}", names.len(), self.database);
        Ok(names
            .into_iter()
            .map(|name| CollectionHandle { name })
            .collect())
    }

    async fn describe(&self, handle: &CollectionHandle) -> ServiceResult<Descriptor> {
        Ok(self
            .backend
            .collection_stats(&self.database, &handle.name)
            .await?)
    }

    async fn remove_one(&self, handle: CollectionHandle) -> ServiceResult<()> {
        debug!("Dropping collection {}.{}", self.database, handle.name);
        if self
            .backend
            .drop_collection(&self.database, &handle.name)
            .await?
        {
            Ok(())
        } else {
            Err(ServiceError::not_found(KIND, handle.name))
        }
    }

    fn normalize(&self, raw: Descriptor) -> Descriptor {
        let Some(Value::String(namespace)) = raw.get(IDENTITY_KEY) else {
            return raw;
        };

        let name = match namespace.split_once('.') {
            Some((_, collection)) => collection.to_string(),
            None => namespace.clone(),
        };
        with_name(raw, IDENTITY_KEY, Value::String(name))
    }
}

/// Build the collection service for `options.database`.
pub fn init<B: Backend>(
    options: ServiceOptions<B>,
) -> ServiceResult<ResourceService<CollectionAdapter<B>>> {
    let database = options.require_database(KIND)?;
    let adapter = CollectionAdapter::new(options.backend.clone(), database);
    Ok(options.build_service(adapter))
}
