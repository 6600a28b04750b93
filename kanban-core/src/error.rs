//! Error types for board operations

use crate::EntityKind;
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity:?} with id {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Insert failed for {entity:?}: {reason}")]
    InsertFailed { entity: EntityKind, reason: String },

    /// The backend refused the unit of work because of a concurrent writer
    /// (serialization failure, deadlock, lock timeout). Safe to retry.
    #[error("Concurrent modification: {reason}")]
    Conflict { reason: String },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Storage backend error: {reason}")]
    Backend { reason: String },
}

impl StorageError {
    /// Whether retrying the whole unit of work may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StorageError::Conflict { .. })
    }
}

/// Validation errors. Raised before any mutation is attempted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field {field} is too long: {len} > {max}")]
    TooLong { field: String, len: usize, max: usize },
}

/// Master error type for board operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KanbanError {
    /// The referenced entity does not exist, or is not visible to the caller.
    #[error("{entity:?} {id} not found")]
    NotFound { entity: EntityKind, id: Uuid },

    /// The caller does not own the referenced (or transitively referenced) entity.
    #[error("Forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A move could not be applied consistently after retrying.
    #[error("Concurrency conflict persisted after {attempts} attempts")]
    ConcurrencyConflict { attempts: u32 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl KanbanError {
    pub fn not_found(entity: EntityKind, id: impl Into<Uuid>) -> Self {
        KanbanError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        KanbanError::Forbidden {
            reason: reason.into(),
        }
    }
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type alias for board operations.
pub type KanbanResult<T> = Result<T, KanbanError>;

// =============================================================================
// TESTS
// =============================================================================
