//! In-memory backend implementation.
//!
//! This module provides a thread-safe in-memory implementation of the
//! [`Backend`] trait using `HashMap` and an async `RwLock`. It behaves like a
//! small document server: databases hold collections of JSON documents and a
//! user registry. It is designed for tests, development, and embedding where a
//! live server is not available.
//!
//! # Features
//!
//! * Thread-safe concurrent access with async RwLock
//! * Native document shapes (`db`, `ns`, `user` identity keys)
//! * Passwords kept only as salted SHA-256 digests
//! * Optional emulation of servers without the `usersInfo` command
//!
//! # Example Usage
//!
//! ```rust
//! use mongodb_management::backend::{Backend, InMemoryBackend};
//! use serde_json::{Map, json};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = InMemoryBackend::new();
//!
//! backend.create_collection("shop", "orders", Map::new()).await?;
//! backend
//!     .insert_documents("shop", "orders", vec![json!({"sku": "A1"})])
//!     .await;
//!
//! let stats = backend.collection_stats("shop", "orders").await?;
//! assert_eq!(stats["count"], 1);
//! # Ok(())
//! # }
//! ```

use crate::backend::{Backend, BackendError, BackendResult, DatabaseInfo, Document};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use log::{debug, trace};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

const SCRAM_MECHANISM: &str = "SCRAM-SHA-256";
const ITERATION_COUNT: u64 = 15000;
const DEFAULT_INDEX_SIZE: u64 = 4096;

#[derive(Debug, Clone, Default)]
struct CollectionState {
    name: String,
    capped: bool,
    documents: Vec<Value>,
}

impl CollectionState {
    fn data_size(&self) -> u64 {
        self.documents.iter().map(document_size).sum()
    }
}

#[derive(Debug, Clone)]
struct UserRecord {
    user_id: Uuid,
    name: String,
    roles: Vec<Value>,
    custom_data: Option<Value>,
    salt: String,
    stored_key: String,
}

#[derive(Debug, Clone, Default)]
struct DatabaseState {
    // Creation order is the listing order.
    collections: Vec<CollectionState>,
    users: Vec<UserRecord>,
}

impl DatabaseState {
    fn collection(&self, name: &str) -> Option<&CollectionState> {
        self.collections.iter().find(|c| c.name == name)
    }

    fn objects(&self) -> u64 {
        self.collections.iter().map(|c| c.documents.len() as u64).sum()
    }

    fn data_size(&self) -> u64 {
        self.collections.iter().map(CollectionState::data_size).sum()
    }
}

/// Thread-safe in-memory backend.
///
/// Cloning is cheap and clones share the same server state.
#[derive(Clone)]
pub struct InMemoryBackend {
    // Structure: database name -> database state
    databases: Arc<RwLock<HashMap<String, DatabaseState>>>,
    users_info_command: bool,
}

impl InMemoryBackend {
    /// Create a new empty backend.
    pub fn new() -> Self {
        Self {
            databases: Arc::new(RwLock::new(HashMap::new())),
            users_info_command: true,
        }
    }

    /// Emulate a server that predates the `usersInfo` command.
    pub fn without_users_info_command(mut self) -> Self {
        self.users_info_command = false;
        self
    }

    /// Insert raw documents into a collection, creating it implicitly.
    ///
    /// Returns the number of documents inserted.
    pub async fn insert_documents(
        &self,
        db: &str,
        collection: &str,
        documents: Vec<Value>,
    ) -> usize {
        let mut guard = self.databases.write().await;
        let database = guard.entry(db.to_string()).or_default();

        let index = match database.collections.iter().position(|c| c.name == collection) {
            Some(index) => index,
            None => {
                database.collections.push(CollectionState {
                    name: collection.to_string(),
                    ..Default::default()
                });
                database.collections.len() - 1
            }
        };

        let inserted = documents.len();
        database.collections[index].documents.extend(documents);
        trace!("Inserted {} documents into {}.{}", inserted, db, collection);
        inserted
    }

    /// Check a password against the stored credential of a user.
    pub async fn verify_password(&self, db: &str, user: &str, password: &str) -> bool {
        let guard = self.databases.read().await;
        guard
            .get(db)
            .and_then(|database| database.users.iter().find(|u| u.name == user))
            .map(|record| digest(&record.salt, password) == record.stored_key)
            .unwrap_or(false)
    }

    /// Get backend statistics for debugging and assertions.
    pub async fn stats(&self) -> InMemoryBackendStats {
        let guard = self.databases.read().await;
        let mut stats = InMemoryBackendStats::default();

        for database in guard.values() {
            stats.database_count += 1;
            stats.collection_count += database.collections.len();
            stats.user_count += database.users.len();
        }

        stats
    }

    fn stats_document(name: &str, database: Option<&DatabaseState>) -> Document {
        let collections = database.map(|d| d.collections.len()).unwrap_or(0) as u64;
        let objects = database.map(DatabaseState::objects).unwrap_or(0);
        let data_size = database.map(DatabaseState::data_size).unwrap_or(0);
        let avg_obj_size = if objects > 0 { data_size / objects } else { 0 };

        object(json!({
            "db": name,
            "collections": collections,
            "views": 0,
            "objects": objects,
            "avgObjSize": avg_obj_size,
            "dataSize": data_size,
            "storageSize": data_size,
            "indexes": collections,
            "indexSize": collections * DEFAULT_INDEX_SIZE,
            "ok": 1
        }))
    }

    fn user_document(db: &str, record: &UserRecord, with_credentials: bool) -> Document {
        let mut document = object(json!({
            "_id": format!("{}.{}", db, record.name),
            "userId": record.user_id.to_string(),
            "user": record.name,
            "db": db,
            "roles": record.roles,
            "mechanisms": [SCRAM_MECHANISM]
        }));

        if let Some(custom_data) = &record.custom_data {
            document.insert("customData".to_string(), custom_data.clone());
        }

        if with_credentials {
            document.insert(
                "credentials".to_string(),
                json!({
                    SCRAM_MECHANISM: {
                        "iterationCount": ITERATION_COUNT,
                        "salt": record.salt,
                        "storedKey": record.stored_key
                    }
                }),
            );
        }

        document
    }

    fn parse_roles(db: &str, options: &Document) -> BackendResult<Vec<Value>> {
        let roles = match options.get("roles") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(roles)) => roles,
            Some(_) => {
                return Err(BackendError::invalid_options(
                    "createUser",
                    "roles must be an array",
                ));
            }
        };

        roles
            .iter()
            .map(|role| match role {
                Value::String(name) => Ok(json!({"role": name, "db": db})),
                Value::Object(fields) if fields.get("role").is_some_and(Value::is_string) => {
                    let role_db = fields.get("db").and_then(Value::as_str).unwrap_or(db);
                    Ok(json!({"role": fields["role"], "db": role_db}))
                }
                other => Err(BackendError::invalid_options(
                    "createUser",
                    format!("invalid role specification: {}", other),
                )),
            })
            .collect()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for InMemoryBackend {
    async fn list_databases(&self) -> BackendResult<Vec<DatabaseInfo>> {
        let guard = self.databases.read().await;

        let mut names: Vec<_> = guard.keys().collect();
        names.sort();

        Ok(names
            .into_iter()
            .map(|name| {
                let database = &guard[name];
                DatabaseInfo {
                    name: name.clone(),
                    size_on_disk: database.data_size(),
                    empty: database.objects() == 0,
                }
            })
            .collect())
    }

    async fn create_database(&self, name: &str, _options: Document) -> BackendResult<Document> {
        let mut guard = self.databases.write().await;
        let database = guard.entry(name.to_string()).or_default();
        debug!("Created database {}", name);
        Ok(Self::stats_document(name, Some(database)))
    }

    async fn database_stats(&self, name: &str) -> BackendResult<Document> {
        let guard = self.databases.read().await;
        Ok(Self::stats_document(name, guard.get(name)))
    }

    async fn drop_database(&self, name: &str) -> BackendResult<bool> {
        let mut guard = self.databases.write().await;
        Ok(guard.remove(name).is_some())
    }

    async fn list_collections(&self, db: &str) -> BackendResult<Vec<String>> {
        let guard = self.databases.read().await;
        Ok(guard
            .get(db)
            .map(|database| database.collections.iter().map(|c| c.name.clone()).collect())
            .unwrap_or_default())
    }

    async fn create_collection(
        &self,
        db: &str,
        name: &str,
        options: Document,
    ) -> BackendResult<()> {
        let capped = options.get("capped").and_then(Value::as_bool).unwrap_or(false);
        if capped && !options.get("size").is_some_and(Value::is_number) {
            return Err(BackendError::invalid_options(
                "create",
                "the 'size' option is required when 'capped' is true",
            ));
        }

        let mut guard = self.databases.write().await;
        let database = guard.entry(db.to_string()).or_default();

        if database.collection(name).is_some() {
            return Err(BackendError::namespace_exists(format!("{}.{}", db, name)));
        }

        database.collections.push(CollectionState {
            name: name.to_string(),
            capped,
            documents: Vec::new(),
        });
        debug!("Created collection {}.{}", db, name);
        Ok(())
    }

    async fn collection_stats(&self, db: &str, name: &str) -> BackendResult<Document> {
        let guard = self.databases.read().await;
        let collection = guard
            .get(db)
            .and_then(|database| database.collection(name))
            .ok_or_else(|| BackendError::namespace_not_found(format!("{}.{}", db, name)))?;

        let count = collection.documents.len() as u64;
        let size = collection.data_size();
        let avg_obj_size = if count > 0 { size / count } else { 0 };

        Ok(object(json!({
            "ns": format!("{}.{}", db, name),
            "count": count,
            "size": size,
            "avgObjSize": avg_obj_size,
            "storageSize": size,
            "nindexes": 1,
            "totalIndexSize": DEFAULT_INDEX_SIZE,
            "capped": collection.capped,
            "ok": 1
        })))
    }

    async fn drop_collection(&self, db: &str, name: &str) -> BackendResult<bool> {
        let mut guard = self.databases.write().await;
        let Some(database) = guard.get_mut(db) else {
            return Ok(false);
        };

        let before = database.collections.len();
        database.collections.retain(|c| c.name != name);
        Ok(database.collections.len() != before)
    }

    async fn users_info(&self, db: &str, user: Option<&str>) -> BackendResult<Vec<Document>> {
        if !self.users_info_command {
            return Err(BackendError::command_not_supported("usersInfo"));
        }

        let guard = self.databases.read().await;
        Ok(guard
            .get(db)
            .map(|database| {
                database
                    .users
                    .iter()
                    .filter(|record| user.is_none_or(|name| record.name == name))
                    .map(|record| Self::user_document(db, record, false))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn system_users(&self, db: &str) -> BackendResult<Vec<Document>> {
        let guard = self.databases.read().await;
        Ok(guard
            .get(db)
            .map(|database| {
                database
                    .users
                    .iter()
                    .map(|record| Self::user_document(db, record, true))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add_user(
        &self,
        db: &str,
        name: &str,
        password: &str,
        options: Document,
    ) -> BackendResult<Document> {
        let roles = Self::parse_roles(db, &options)?;

        let mut guard = self.databases.write().await;
        let database = guard.entry(db.to_string()).or_default();

        if database.users.iter().any(|u| u.name == name) {
            return Err(BackendError::UserExists {
                db: db.to_string(),
                user: name.to_string(),
            });
        }

        let salt = STANDARD.encode(Uuid::new_v4().as_bytes());
        let record = UserRecord {
            user_id: Uuid::new_v4(),
            name: name.to_string(),
            roles,
            custom_data: options.get("customData").cloned(),
            stored_key: digest(&salt, password),
            salt,
        };

        let document = Self::user_document(db, &record, false);
        database.users.push(record);
        debug!("Added user {} to database {}", name, db);
        Ok(document)
    }

    async fn remove_user(&self, db: &str, name: &str) -> BackendResult<bool> {
        let mut guard = self.databases.write().await;
        let Some(database) = guard.get_mut(db) else {
            return Ok(false);
        };

        let before = database.users.len();
        database.users.retain(|u| u.name != name);
        Ok(database.users.len() != before)
    }
}

/// Statistics about the current state of the in-memory backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryBackendStats {
    /// Number of databases
    pub database_count: usize,
    /// Number of collections across all databases
    pub collection_count: usize,
    /// Number of users across all databases
    pub user_count: usize,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}

fn document_size(document: &Value) -> u64 {
    serde_json::to_vec(document).map(|bytes| bytes.len() as u64).unwrap_or(0)
}

fn object(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}
