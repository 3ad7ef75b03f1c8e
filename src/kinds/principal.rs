//! Principal (database user) resource kind.
//!
//! Principals are listed with the `usersInfo` command. Servers that predate
//! the command, or services configured with `has_users_info_command = false`,
//! read the `system.users` collection instead. User documents already are
//! descriptors, so principal handles never need a statistics call.

use crate::adapter::{ResourceAdapter, ResourceHandle, rename_identity};
use crate::backend::{Backend, Document};
use crate::error::{ServiceError, ServiceResult, ValidationError};
use crate::query::Descriptor;
use crate::service::{ResourceService, ServiceOptions};
use log::{debug, warn};
use serde_json::Value;

const KIND: &str = "principal";
const IDENTITY_KEY: &str = "user";
const PASSWORD_FIELD: &str = "password";
// Stored credentials never leave the adapter.
const CREDENTIALS_FIELD: &str = "credentials";

/// Handle carrying the user document it was resolved from.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalHandle {
    name: String,
    info: Document,
}

impl PrincipalHandle {
    fn from_document(mut info: Document) -> Option<Self> {
        info.remove(CREDENTIALS_FIELD);
        let name = info.get(IDENTITY_KEY)?.as_str()?.to_string();
        Some(Self { name, info })
    }
}

impl ResourceHandle for PrincipalHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_descriptor(&self) -> Option<Descriptor> {
        Some(self.info.clone())
    }
}

/// Adapter exposing the users of one database.
#[derive(Debug, Clone)]
pub struct PrincipalAdapter<B: Backend> {
    backend: B,
    database: String,
    has_users_info_command: bool,
}

impl<B: Backend> PrincipalAdapter<B> {
    pub fn new(backend: B, database: impl Into<String>) -> Self {
        Self {
            backend,
            database: database.into(),
            has_users_info_command: true,
        }
    }

    /// Choose between the `usersInfo` command and the `system.users` fallback.
    pub fn with_users_info_command(mut self, enabled: bool) -> Self {
        self.has_users_info_command = enabled;
        self
    }

    async fn user_documents(&self, user: Option<&str>) -> ServiceResult<Vec<Document>> {
        if self.has_users_info_command {
            match self.backend.users_info(&self.database, user).await {
                Ok(documents) => return Ok(documents),
                Err(error) if error.is_command_not_supported() => {
                    warn!("{}, reading system.users of {}", error, self.database);
                }
                Err(error) => return Err(error.into()),
            }
        }

        let documents = self.backend.system_users(&self.database).await?;
        Ok(documents
            .into_iter()
            .filter(|document| {
                user.is_none_or(|name| {
                    document.get(IDENTITY_KEY).and_then(Value::as_str) == Some(name)
                })
            })
            .collect())
    }

    fn handles_from(&self, documents: Vec<Document>) -> Vec<PrincipalHandle> {
        documents
            .into_iter()
            .filter_map(|document| {
                let id = document.get("_id").cloned();
                let handle = PrincipalHandle::from_document(document);
                if handle.is_none() {
                    warn!(
                        "Skipping user document {:?} in {} without a '{}' name",
                        id, self.database, IDENTITY_KEY
                    );
                }
                handle
            })
            .collect()
    }
}

impl<B: Backend> ResourceAdapter for PrincipalAdapter<B> {
    type Handle = PrincipalHandle;

    fn kind(&self) -> &'static str {
        KIND
    }

    async fn create_one(&self, name: &str, mut options: Descriptor) -> ServiceResult<Descriptor> {
        let password = match options.remove(PASSWORD_FIELD) {
            Some(Value::String(password)) if !password.is_empty() => password,
            Some(Value::String(_)) | Some(Value::Null) | None => {
                return Err(ValidationError::missing_required(KIND, PASSWORD_FIELD).into());
            }
            Some(_) => return Err(ValidationError::invalid_type(PASSWORD_FIELD, "string").into()),
        };

        Ok(self
            .backend
            .add_user(&self.database, name, &password, options)
            .await?)
    }

    async fn get_one(&self, name: &str) -> ServiceResult<Option<PrincipalHandle>> {
        let documents = self.user_documents(Some(name)).await?;
        Ok(self.handles_from(documents).into_iter().next())
    }

    async fn list_all(&self) -> ServiceResult<Vec<PrincipalHandle>> {
        let documents = self.user_documents(None).await?;
        Ok(self.handles_from(documents))
    }

    async fn describe(&self, handle: &PrincipalHandle) -> ServiceResult<Descriptor> {
        Ok(handle.info.clone())
    }

    async fn remove_one(&self, handle: PrincipalHandle) -> ServiceResult<()> {
        debug!("Removing user {} from {}", handle.name, self.database);
        if self.backend.remove_user(&self.database, &handle.name).await? {
            Ok(())
        } else {
            Err(ServiceError::not_found(KIND, handle.name))
        }
    }

    fn normalize(&self, raw: Descriptor) -> Descriptor {
        rename_identity(raw, IDENTITY_KEY)
    }
}

/// Build the principal service for `options.database`.
pub fn init<B: Backend>(
    options: ServiceOptions<B>,
) -> ServiceResult<ResourceService<PrincipalAdapter<B>>> {
    let database = options.require_database(KIND)?;
    let adapter = PrincipalAdapter::new(options.backend.clone(), database)
        .with_users_info_command(options.has_users_info_command);
    Ok(options.build_service(adapter))
}
