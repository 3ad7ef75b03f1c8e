//! Error types for management service operations.
//!
//! The services add exactly three error kinds of their own (validation,
//! not-found and unsupported operation) plus a configuration error raised
//! when a factory is missing required options. Backend failures are carried
//! unchanged in [`ServiceError::Backend`].

use crate::backend::BackendError;

/// Main error type for management service operations.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Request data failed a presence or shape check
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Identifier does not resolve to an existing resource
    #[error("No record found for id '{id}'")]
    NotFound { resource_kind: String, id: String },

    /// Operation that no resource kind defines
    #[error("Unsupported operation '{operation}' for {resource_kind}")]
    UnsupportedOperation {
        resource_kind: String,
        operation: String,
    },

    /// Service factory was given incomplete options
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Failure reported by the backend, passed through untouched
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Validation errors for request data and query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required field is missing or empty
    #[error("Missing required '{field}' for {resource_kind}")]
    MissingRequiredField {
        resource_kind: String,
        field: String,
    },

    /// Field has the wrong JSON type
    #[error("Field '{field}' has invalid type, expected {expected}")]
    InvalidFieldType { field: String, expected: String },

    /// Reserved query parameter could not be interpreted
    #[error("Invalid query parameter '{parameter}': {message}")]
    InvalidQuery { parameter: String, message: String },

    /// Request body is neither an object nor an array of objects
    #[error("Invalid payload: {message}")]
    InvalidPayload { message: String },
}

impl ServiceError {
    /// Create a not-found error for the identifier that was looked up.
    pub fn not_found(resource_kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_kind: resource_kind.into(),
            id: id.into(),
        }
    }

    /// Create an unsupported-operation error.
    pub fn unsupported(resource_kind: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            resource_kind: resource_kind.into(),
            operation: operation.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Identifier carried by a not-found error.
    pub fn not_found_id(&self) -> Option<&str> {
        match self {
            Self::NotFound { id, .. } => Some(id),
            _ => None,
        }
    }
}

impl ValidationError {
    /// Create a missing required field error
    pub fn missing_required(resource_kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            resource_kind: resource_kind.into(),
            field: field.into(),
        }
    }

    /// Create an invalid type error
    pub fn invalid_type(field: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::InvalidFieldType {
            field: field.into(),
            expected: expected.into(),
        }
    }

    /// Create an invalid query parameter error
    pub fn invalid_query(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an invalid payload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidPayload {
            message: message.into(),
        }
    }
}

// Result type aliases for convenience
pub type ServiceResult<T> = Result<T, ServiceError>;
pub type ValidationResult<T> = Result<T, ValidationError>;
