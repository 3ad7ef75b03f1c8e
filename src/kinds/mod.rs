//! Concrete resource kinds.
//!
//! | Kind       | identity key | listing                  | removal          |
//! |------------|--------------|--------------------------|------------------|
//! | database   | `db`         | administrative listing   | drop database    |
//! | collection | `ns`         | per-database listing     | drop collection  |
//! | principal  | `user`       | `usersInfo`/system.users | remove user      |
//!
//! Each module exposes its adapter and an `init` factory taking
//! [`ServiceOptions`](crate::service::ServiceOptions).

pub mod collection;
pub mod database;
pub mod principal;

pub use collection::{CollectionAdapter, CollectionHandle};
pub use database::{DatabaseAdapter, DatabaseHandle};
pub use principal::{PrincipalAdapter, PrincipalHandle};
