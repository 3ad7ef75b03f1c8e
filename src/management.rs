//! Entry point building every management service from one backend.

use crate::backend::Backend;
use crate::config::ManagementConfig;
use crate::error::ServiceResult;
use crate::kinds::{
    CollectionAdapter, DatabaseAdapter, PrincipalAdapter, collection, database, principal,
};
use crate::service::{ResourceService, ServiceOptions};
use log::info;

/// Factory for the database, collection and principal services sharing one backend.
///
/// ```rust
/// use mongodb_management::{InMemoryBackend, Management, ManagementConfig};
///
/// let config = ManagementConfig::default().with_database("app");
/// let management = Management::new(InMemoryBackend::new(), config);
///
/// let databases = management.databases().unwrap();
/// let users = management.principals().unwrap();
/// // Collections of another database
/// let logs = management.collections_in("logs").unwrap();
/// # let _ = (databases, users, logs);
/// ```
#[derive(Clone)]
pub struct Management<B: Backend> {
    backend: B,
    config: ManagementConfig,
}

impl<B: Backend> Management<B> {
    pub fn new(backend: B, config: ManagementConfig) -> Self {
        info!(
            "Initializing management services (database: {:?}, pagination: {:?})",
            config.database, config.paginate
        );
        Self { backend, config }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &ManagementConfig {
        &self.config
    }

    fn options(&self) -> ServiceOptions<B> {
        ServiceOptions::from_config(self.backend.clone(), &self.config)
    }

    /// Service over every database of the server.
    pub fn databases(&self) -> ServiceResult<ResourceService<DatabaseAdapter<B>>> {
        database::init(self.options())
    }

    /// Service over the collections of the configured database.
    pub fn collections(&self) -> ServiceResult<ResourceService<CollectionAdapter<B>>> {
        collection::init(self.options())
    }

    /// Service over the collections of `database`.
    pub fn collections_in(
        &self,
        database: &str,
    ) -> ServiceResult<ResourceService<CollectionAdapter<B>>> {
        collection::init(self.options().with_database(database))
    }

    /// Service over the users of the configured database.
    pub fn principals(&self) -> ServiceResult<ResourceService<PrincipalAdapter<B>>> {
        principal::init(self.options())
    }

    /// Service over the users of `database`.
    pub fn principals_in(
        &self,
        database: &str,
    ) -> ServiceResult<ResourceService<PrincipalAdapter<B>>> {
        principal::init(self.options().with_database(database))
    }
}
