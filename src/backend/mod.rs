//! Backend client abstraction for the management services.
//!
//! This module defines the native management primitives the resource adapters
//! are built on. The `Backend` trait mirrors the administrative surface of a
//! document database server: listing and dropping databases, creating and
//! describing collections, and the user-administration commands.
//!
//! # Architecture
//!
//! The backend layer is responsible for:
//! - Executing native management calls against the server
//! - Returning native documents with native field names (`db`, `ns`, `user`)
//! - Reporting native failures as [`BackendError`]
//!
//! The backend layer is NOT responsible for:
//! - Renaming native identity fields into a uniform shape
//! - Filtering, sorting, paginating or projecting listings
//! - Deciding whether a missing resource is an error
//!
//! # Example Usage
//!
//! ```rust
//! use mongodb_management::backend::{Backend, InMemoryBackend};
//! use serde_json::Map;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = InMemoryBackend::new();
//!
//! backend.create_database("reports", Map::new()).await?;
//! backend.create_collection("reports", "daily", Map::new()).await?;
//!
//! let stats = backend.collection_stats("reports", "daily").await?;
//! assert_eq!(stats["ns"], "reports.daily");
//!
//! let dropped = backend.drop_database("reports").await?;
//! assert!(dropped);
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;

pub use errors::{BackendError, BackendResult};
pub use in_memory::{InMemoryBackend, InMemoryBackendStats};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::future::Future;

/// A native document as returned by the backend.
pub type Document = Map<String, Value>;

/// One entry of the administrative database listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfo {
    /// Database name
    pub name: String,
    /// Approximate on-disk footprint in bytes
    pub size_on_disk: u64,
    /// Whether the database holds no documents
    pub empty: bool,
}

/// Native management primitives of a database server.
///
/// Implementations are cheap to clone and share their connection state, so
/// several adapters can hold the same backend. Every call maps to one native
/// administrative command; no call retries or translates errors.
///
/// # Design Principles
///
/// - **Native shapes**: documents keep the server's own field names
/// - **Existence as data**: drops return `false` for absent targets instead of failing
/// - **Async first**: all operations return futures
pub trait Backend: Clone + Send + Sync + 'static {
    /// List every database known to the server (administrative listing).
    fn list_databases(&self) -> impl Future<Output = BackendResult<Vec<DatabaseInfo>>> + Send;

    /// Create a database and return its statistics document.
    ///
    /// Creating a database that already exists is not an error; the current
    /// statistics are returned.
    fn create_database(
        &self,
        name: &str,
        options: Document,
    ) -> impl Future<Output = BackendResult<Document>> + Send;

    /// Statistics for a database. The database name is carried under `db`.
    fn database_stats(&self, name: &str) -> impl Future<Output = BackendResult<Document>> + Send;

    /// Drop a database. Returns `false` if it did not exist.
    fn drop_database(&self, name: &str) -> impl Future<Output = BackendResult<bool>> + Send;

    /// Names of the collections of a database, in creation order.
    fn list_collections(&self, db: &str) -> impl Future<Output = BackendResult<Vec<String>>> + Send;

    /// Create a collection.
    ///
    /// # Errors
    ///
    /// [`BackendError::NamespaceExists`] if the collection already exists.
    fn create_collection(
        &self,
        db: &str,
        name: &str,
        options: Document,
    ) -> impl Future<Output = BackendResult<()>> + Send;

    /// Statistics for a collection. The namespace `<db>.<name>` is carried under `ns`.
    ///
    /// # Errors
    ///
    /// [`BackendError::NamespaceNotFound`] if the collection does not exist.
    fn collection_stats(
        &self,
        db: &str,
        name: &str,
    ) -> impl Future<Output = BackendResult<Document>> + Send;

    /// Drop a collection. Returns `false` if it did not exist.
    fn drop_collection(&self, db: &str, name: &str)
    -> impl Future<Output = BackendResult<bool>> + Send;

    /// Run the `usersInfo` command for one user, or for every user when `user` is `None`.
    ///
    /// # Errors
    ///
    /// [`BackendError::CommandNotSupported`] on servers without the command.
    fn users_info(
        &self,
        db: &str,
        user: Option<&str>,
    ) -> impl Future<Output = BackendResult<Vec<Document>>> + Send;

    /// Read the `system.users` collection of a database.
    fn system_users(&self, db: &str) -> impl Future<Output = BackendResult<Vec<Document>>> + Send;

    /// Register a user and return its user document.
    fn add_user(
        &self,
        db: &str,
        name: &str,
        password: &str,
        options: Document,
    ) -> impl Future<Output = BackendResult<Document>> + Send;

    /// Remove a user by native username. Returns `false` if it did not exist.
    fn remove_user(&self, db: &str, name: &str) -> impl Future<Output = BackendResult<bool>> + Send;
}
