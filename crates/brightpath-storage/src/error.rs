//! Error types for the storage abstraction layer.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The entity kind that was not found.
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Attempted to create an entity violating a uniqueness constraint.
    #[error("{entity} already exists: {key}")]
    AlreadyExists {
        /// The entity kind.
        entity: String,
        /// The conflicting key value.
        key: String,
    },

    /// A state conflict, such as booking a slot that is already taken.
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict.
        message: String,
    },

    /// A referenced entity does not exist.
    #[error("Invalid reference: {message}")]
    InvalidReference {
        /// Description of the broken reference.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(entity: impl Into<String>, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity: entity.into(),
            key: key.into(),
        }
    }

    /// Creates a new `Conflict` error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidReference` error.
    #[must_use]
    pub fn invalid_reference(message: impl Into<String>) -> Self {
        Self::InvalidReference {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error maps to a 404.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = StorageError::not_found("Consultant", "abc");
        assert_eq!(err.to_string(), "Consultant not found: abc");

        let err = StorageError::already_exists("Category", "General");
        assert_eq!(err.to_string(), "Category already exists: General");

        let err = StorageError::conflict("slot is already booked");
        assert_eq!(err.to_string(), "Conflict: slot is already booked");
    }

    #[test]
    fn is_not_found_matches_only_not_found() {
        assert!(StorageError::not_found("User", "1").is_not_found());
        assert!(!StorageError::internal("boom").is_not_found());
    }
}
