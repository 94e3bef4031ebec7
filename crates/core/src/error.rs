//! Error types for cairn
//!
//! All failures of the schema and search subsystems are represented by the
//! [`Error`] enum. Variants carry named fields so callers can match on the
//! details instead of parsing messages.
//!
//! # Categories
//!
//! | Category | Variants | Mutation state |
//! |----------|----------|----------------|
//! | Access | `PermissionDenied`, `LockAcquisitionFailure` | untouched |
//! | Validation | `DuplicateClassName`, `DuplicatePropertyName`, `InvalidNaming`, `InvalidDataType` | untouched |
//! | Post-mutation | `PersistenceError`, `MigrationError` | in-memory schema already changed |
//! | Search | `EncodingError`, `TransportError`, `BackendResponseError`, `ResponseClassificationError`, `DecodeError`, `CancellationError` | n/a |
//! | Config | `InvalidConfig` | n/a |
//!
//! Post-mutation errors are never rolled back automatically. They are
//! reported with their own variants so an operator can reconcile the durable
//! schema or the storage layer by hand.

use thiserror::Error;

/// Result type alias for cairn operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for cairn
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // ==================== Access ====================
    /// The principal may not perform the action on the resource
    #[error("permission denied: {principal} may not {action} {resource}")]
    PermissionDenied {
        /// Display form of the principal
        principal: String,
        /// Attempted action, e.g. "create"
        action: String,
        /// Resource path, e.g. "schema/things"
        resource: String,
    },

    /// The process-wide schema lock could not be obtained
    #[error("could not acquire schema lock: {reason}")]
    LockAcquisitionFailure {
        /// Why the lock was not acquired
        reason: String,
    },

    // ==================== Validation ====================
    /// A class with this (normalized) name exists in either kind
    #[error("name '{name}' already used as a name for an existing class")]
    DuplicateClassName {
        /// The clashing class name
        name: String,
    },

    /// Two properties of one class share a (normalized) name
    #[error("name '{property}' already in use as a property name for class '{class}'")]
    DuplicatePropertyName {
        /// Owning class
        class: String,
        /// The clashing property name
        property: String,
    },

    /// A class name, property name or keyword breaks the naming rules
    #[error("invalid name '{name}': {reason}")]
    InvalidNaming {
        /// The offending name or keyword
        name: String,
        /// Rule that was broken
        reason: String,
    },

    /// A property's declared data type does not resolve against the schema
    #[error("data type of property '{property}' in class '{class}' is invalid: {reason}")]
    InvalidDataType {
        /// Owning class
        class: String,
        /// Property whose data type failed to resolve
        property: String,
        /// Resolution failure
        reason: String,
    },

    // ==================== Post-mutation ====================
    /// The schema was changed in memory but could not be persisted
    #[error("schema persistence failed: {reason}")]
    PersistenceError {
        /// Underlying store failure
        reason: String,
    },

    /// The schema is persisted but the storage layer did not apply the change
    #[error("migration of class '{class}' failed: {reason}")]
    MigrationError {
        /// Class being migrated
        class: String,
        /// Underlying migrator failure
        reason: String,
    },

    // ==================== Search ====================
    /// A request body could not be serialized
    #[error("{operation}: encode json: {reason}")]
    EncodingError {
        /// Operation that was encoding, e.g. "vector search"
        operation: String,
        /// Serializer failure
        reason: String,
    },

    /// The backend could not be reached
    #[error("{operation}: transport: {reason}")]
    TransportError {
        /// Operation in flight
        operation: String,
        /// Network failure
        reason: String,
    },

    /// The backend answered with a classified, non-success response
    #[error("{operation}: backend returned {status} ({error_type}): {reason}")]
    BackendResponseError {
        /// Operation in flight
        operation: String,
        /// HTTP status
        status: u16,
        /// Backend error type, e.g. "index_not_found_exception"
        error_type: String,
        /// Backend error reason
        reason: String,
    },

    /// A non-success response whose error payload could not be parsed
    #[error("{operation}: unclassifiable {status} response: {reason}")]
    ResponseClassificationError {
        /// Operation in flight
        operation: String,
        /// HTTP status
        status: u16,
        /// Parse failure or raw body excerpt
        reason: String,
    },

    /// Malformed response content; `index` names the offending hit
    #[error("{operation}: {}: {reason}", hit_label(.index))]
    DecodeError {
        /// Operation in flight
        operation: String,
        /// Position of the offending hit, `None` for the envelope
        index: Option<usize>,
        /// Decode failure
        reason: String,
    },

    /// The caller's context was cancelled or its deadline passed
    #[error("{operation}: context cancelled")]
    CancellationError {
        /// Operation that was aborted
        operation: String,
    },

    // ==================== Config ====================
    /// Configuration is missing or malformed
    #[error("invalid config: {reason}")]
    InvalidConfig {
        /// What is wrong
        reason: String,
    },
}

fn hit_label(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!("result {}", i),
        None => "response".to_string(),
    }
}

impl Error {
    /// Create a decode error for hit `index`
    pub fn decode_at(operation: impl Into<String>, index: usize, reason: impl Into<String>) -> Self {
        Error::DecodeError {
            operation: operation.into(),
            index: Some(index),
            reason: reason.into(),
        }
    }

    /// Create a decode error for the response envelope
    pub fn decode_envelope(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::DecodeError {
            operation: operation.into(),
            index: None,
            reason: reason.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(operation: impl Into<String>) -> Self {
        Error::CancellationError {
            operation: operation.into(),
        }
    }

    /// Create an invalid-config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Error::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// True when the error happened after the in-memory schema was changed.
    ///
    /// The schema may then disagree with the durable copy or the storage
    /// layer until reconciled.
    pub fn is_post_mutation(&self) -> bool {
        matches!(
            self,
            Error::PersistenceError { .. } | Error::MigrationError { .. }
        )
    }

    /// True when the same call may succeed if simply issued again.
    ///
    /// Validation, permission and encoding errors need different input and
    /// are not retryable in this sense.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::LockAcquisitionFailure { .. }
                | Error::TransportError { .. }
                | Error::CancellationError { .. }
        )
    }
}
