//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lookups, duplicates). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,

    /// A uniqueness rule was violated (e.g. username already taken).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Credentials were missing or rejected.
    #[error("unauthorized")]
    Unauthorized,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Human-readable detail without the variant prefix.
    ///
    /// Used where the message is shown to an end user as-is.
    pub fn detail(&self) -> String {
        match self {
            Self::Validation(msg) | Self::InvalidId(msg) | Self::Conflict(msg) => msg.clone(),
            Self::NotFound => "not found".to_string(),
            Self::Unauthorized => "unauthorized".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_strips_variant_prefix() {
        let err = DomainError::conflict("Username already registered");
        assert_eq!(err.to_string(), "conflict: Username already registered");
        assert_eq!(err.detail(), "Username already registered");
    }
}
