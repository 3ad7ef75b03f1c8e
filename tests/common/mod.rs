//! Common test utilities for the management services.

use mongodb_management::backend::{Backend, InMemoryBackend};
use mongodb_management::{Management, ManagementConfig, PaginationPolicy};
use serde_json::Map;

pub mod fixtures;

use fixtures::{APP_DATABASE, SEED_COLLECTIONS};

/// Initialise `env_logger` once; honours `RUST_LOG`.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Pagination used by the reference service configuration.
pub fn test_pagination() -> PaginationPolicy {
    PaginationPolicy::new(10, Some(50))
}

/// Services scoped to [`APP_DATABASE`] with pagination disabled.
pub fn management(backend: InMemoryBackend) -> Management<InMemoryBackend> {
    init_logging();
    Management::new(backend, ManagementConfig::default().with_database(APP_DATABASE))
}

/// Services scoped to [`APP_DATABASE`] with `paginate {default: 10, max: 50}`.
pub fn paginated_management(backend: InMemoryBackend) -> Management<InMemoryBackend> {
    init_logging();
    Management::new(
        backend,
        ManagementConfig::default()
            .with_database(APP_DATABASE)
            .with_paginate(test_pagination()),
    )
}

/// Backend holding [`APP_DATABASE`] with the seed collections.
pub async fn seeded_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    for name in SEED_COLLECTIONS {
        backend
            .create_collection(APP_DATABASE, name, Map::new())
            .await
            .expect("seed collection");
    }
    backend
}

/// Backend holding `count` empty collections named `c00`, `c01`, ...
pub async fn backend_with_collections(count: usize) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    for index in 0..count {
        backend
            .create_collection(APP_DATABASE, &format!("c{:02}", index), Map::new())
            .await
            .expect("numbered collection");
    }
    backend
}
