//! Error types for the relationship resolution and query composition core.
//!
//! Declaration failures that stem from load ordering (`MissingTarget`,
//! `NoPathThroughRelationship`) are recoverable while the registry is
//! deferring and terminal once it is resolving. Query composition errors
//! are always terminal.

use crate::relationships::metadata::RelationshipKind;

/// Result type alias for ORM operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Why a relationship declaration could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeclarationErrorKind {
    /// The referenced record type or relationship is not (yet, or ever) defined
    #[error("target '{target}' is not defined")]
    MissingTarget { target: String },

    /// A through chain cannot be connected hop-to-hop
    #[error("no path through relationship '{through}': {detail}")]
    NoPathThroughRelationship { through: String, detail: String },

    /// A many-to-many declaration reached the build step without its pivot
    #[error("pivot configuration is missing")]
    MissingPivot,
}

/// A declaration failure, naming the owner type, relationship name and kind
/// so the offending declaration can be located in source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("relationship '{relationship}' ({kind}) on '{owner}': {reason}")]
pub struct DeclarationError {
    pub owner: String,
    pub relationship: String,
    pub kind: RelationshipKind,
    pub reason: DeclarationErrorKind,
}

impl DeclarationError {
    pub fn missing_target(
        owner: &str,
        relationship: &str,
        kind: RelationshipKind,
        target: &str,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            relationship: relationship.to_string(),
            kind,
            reason: DeclarationErrorKind::MissingTarget {
                target: target.to_string(),
            },
        }
    }

    pub fn no_path(
        owner: &str,
        relationship: &str,
        kind: RelationshipKind,
        through: &str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.to_string(),
            relationship: relationship.to_string(),
            kind,
            reason: DeclarationErrorKind::NoPathThroughRelationship {
                through: through.to_string(),
                detail: detail.into(),
            },
        }
    }

    pub fn missing_pivot(owner: &str, relationship: &str, kind: RelationshipKind) -> Self {
        Self {
            owner: owner.to_string(),
            relationship: relationship.to_string(),
            kind,
            reason: DeclarationErrorKind::MissingPivot,
        }
    }
}

/// Query composition errors. These indicate programmer error rather than
/// load ordering and are rejected at call time, never deferred.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("column reference cannot be empty")]
    EmptyColumn,

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("limit must be positive, got {0}")]
    InvalidLimit(i64),

    #[error("offset cannot be negative, got {0}")]
    InvalidOffset(i64),

    #[error("join on '{0}' requires at least one ON condition")]
    EmptyJoinCondition(String),

    #[error("predicate on '{0}' requires a value")]
    MissingValue(String),

    #[error("IN predicate on '{0}' requires at least one value")]
    EmptyValueList(String),

    #[error("BETWEEN predicate on '{0}' requires exactly two values, got {1}")]
    InvalidOperandCount(String, usize),
}

/// Connection pool error types
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("connection acquisition failed: {0}")]
    AcquisitionFailed(#[from] sqlx::Error),

    #[error("connection timeout after {timeout}s")]
    ConnectionTimeout { timeout: u64 },

    #[error("configuration error: {message}")]
    ConfigurationError { message: String },
}

/// Umbrella error for ORM operations
#[derive(Debug, thiserror::Error)]
pub enum OrmError {
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for OrmError {
    fn from(err: anyhow::Error) -> Self {
        OrmError::Internal(err.to_string())
    }
}
