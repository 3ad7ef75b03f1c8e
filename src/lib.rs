//! # Database Management Services
//!
//! Administrative CRUD-and-query services over the resources of a document
//! database server: databases, collections and principals (users).
//!
//! Each resource kind has its own native management API with different field
//! names and different meanings for "list" and "remove". This crate puts all
//! of them behind one contract:
//!
//! - [`adapter::ResourceAdapter`] - per-kind capability contract (create, get,
//!   list, describe, remove, normalize)
//! - [`service::ResourceService`] - generic `find`/`create`/`remove` built once
//!   per kind around an adapter
//! - [`query`] - in-memory filter, sort, paginate and project pipeline
//! - [`backend::Backend`] - native primitives of the server, with an
//!   in-memory implementation for tests and embedding
//!
//! ## Quick Start
//!
//! ```rust
//! use mongodb_management::{InMemoryBackend, Management, ManagementConfig, OneOrMany, Params};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let management = Management::new(
//!     InMemoryBackend::new(),
//!     ManagementConfig::default().with_database("app"),
//! );
//!
//! let users = management.principals()?;
//! users
//!     .create(
//!         OneOrMany::from_value(json!({
//!             "name": "alice",
//!             "password": "p",
//!             "roles": ["readWrite"]
//!         }))?,
//!         &Params::new(),
//!     )
//!     .await?;
//!
//! let found = users
//!     .find(&Params::new().with_query(json!({"$select": ["name"]})))
//!     .await?;
//! assert_eq!(found.data()[0], json!({"name": "alice"}).as_object().cloned().unwrap());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod kinds;
pub mod management;
pub mod query;
pub mod service;

// Re-export commonly used types for convenience
pub use adapter::{ResourceAdapter, ResourceHandle};
pub use backend::{Backend, BackendError, InMemoryBackend};
pub use config::ManagementConfig;
pub use error::{ServiceError, ServiceResult, ValidationError};
pub use management::Management;
pub use query::{Descriptor, FindResult, Page, PaginationPolicy, QuerySpec};
pub use service::{OneOrMany, Params, RemoveTarget, ResourceService, ServiceOptions};
