//! Database resource kind.
//!
//! Databases are listed through the administrative listing, described by
//! their statistics document and removed by dropping them. The native
//! statistics carry the database name under `db`.

use crate::adapter::{ResourceAdapter, ResourceHandle, rename_identity};
use crate::backend::Backend;
use crate::error::{ServiceError, ServiceResult};
use crate::query::Descriptor;
use crate::service::{ResourceService, ServiceOptions};
use log::{debug, trace};

const KIND: &str = "database";
const IDENTITY_KEY: &str = "db";

/// Handle to a live database; describing it requires a statistics call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseHandle {
    name: String,
}

impl ResourceHandle for DatabaseHandle {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Adapter exposing the databases of a server.
#[derive(Debug, Clone)]
pub struct DatabaseAdapter<B: Backend> {
    backend: B,
}

impl<B: Backend> DatabaseAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: Backend> ResourceAdapter for DatabaseAdapter<B> {
    type Handle = DatabaseHandle;

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn create_one(&self, name: &str, options: Descriptor) -> ServiceResult<Descriptor> {
        Ok(self.backend.create_database(name, options).await?)
    }

    async fn get_one(&self, name: &str) -> ServiceResult<Option<DatabaseHandle>> {
        let databases = self.backend.list_databases().await?;
        Ok(databases
            .into_iter()
            .find(|info| info.name == name)
            .map(|info| DatabaseHandle { name: info.name }))
    }

    async fn list_all(&self) -> ServiceResult<Vec<DatabaseHandle>> {
        let databases = self.backend.list_databases().await?;
        trace!("Listed {} databases", databases.len());
        Ok(databases
            .into_iter()
            .map(|info| DatabaseHandle { name: info.name })
            .collect())
    }

    async fn describe(&self, handle: &DatabaseHandle) -> ServiceResult<Descriptor> {
        Ok(self.backend.database_stats(&handle.name).await?)
    }

    async fn remove_one(&self, handle: DatabaseHandle) -> ServiceResult<()> {
        debug!("Dropping database {}", handle.name);
        if self.backend.drop_database(&handle.name).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(KIND, handle.name))
        }
    }

    fn normalize(&self, raw: Descriptor) -> Descriptor {
        rename_identity(raw, IDENTITY_KEY)
    }
}

/// Build the database service.
pub fn init<B: Backend>(
    options: ServiceOptions<B>,
) -> ServiceResult<ResourceService<DatabaseAdapter<B>>> {
    let adapter = DatabaseAdapter::new(options.backend.clone());
    Ok(options.build_service(adapter))
}
