//! Backend-native error types.
//!
//! These errors describe failures reported by the server itself (unknown
//! commands, namespace conflicts, permission denials, connectivity). The
//! management services pass them through unchanged.

use thiserror::Error;

/// Errors reported by a [`Backend`](super::Backend) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The server does not know the administrative command.
    #[error("Command '{command}' is not supported by this server")]
    CommandNotSupported { command: String },

    /// A collection or database with this namespace already exists.
    #[error("Namespace already exists: {namespace}")]
    NamespaceExists { namespace: String },

    /// The namespace does not exist on the server.
    #[error("Namespace not found: {namespace}")]
    NamespaceNotFound { namespace: String },

    /// A user with this name already exists in the database.
    #[error("User '{user}' already exists in database '{db}'")]
    UserExists { db: String, user: String },

    /// The connected principal lacks the privilege for the operation.
    #[error("Permission denied for '{operation}' on '{resource}'")]
    PermissionDenied { operation: String, resource: String },

    /// The server cannot be reached.
    #[error("Backend unavailable: {message}")]
    Unavailable { message: String },

    /// Options rejected by the native command.
    #[error("Invalid options for '{command}': {message}")]
    InvalidOptions { command: String, message: String },

    /// Any other server-side failure.
    #[error("Internal backend error: {message}")]
    Internal { message: String },
}

impl BackendError {
    /// Create a command-not-supported error.
    pub fn command_not_supported(command: impl Into<String>) -> Self {
        Self::CommandNotSupported {
            command: command.into(),
        }
    }

    /// Create a namespace-exists error.
    pub fn namespace_exists(namespace: impl Into<String>) -> Self {
        Self::NamespaceExists {
            namespace: namespace.into(),
        }
    }

    /// Create a namespace-not-found error.
    pub fn namespace_not_found(namespace: impl Into<String>) -> Self {
        Self::NamespaceNotFound {
            namespace: namespace.into(),
        }
    }

    /// Create an invalid-options error.
    pub fn invalid_options(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOptions {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Whether the failure signals a missing administrative command.
    pub fn is_command_not_supported(&self) -> bool {
        matches!(self, Self::CommandNotSupported { .. })
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
