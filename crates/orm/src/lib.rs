//! # quarry-orm: relationship resolution and query composition core
//!
//! Record types declare relationships against each other, possibly before
//! the referenced type exists; the registry defers those declarations and
//! [`Registry::solve`](relationships::Registry::solve) retries them to a
//! fixed point, reporting whatever remains unresolvable. Resolved
//! relationships compile into join structures over immutable, structurally
//! shared [`QueryExpression`](query::QueryExpression) values, which emit
//! PostgreSQL-flavored SQL for execution through the connection facility.

pub mod connection;
pub mod error;
pub mod model;
pub mod query;
pub mod relationships;

// Re-export core types
pub use connection::{create_pool, PoolConfig};
pub use error::{
    DeclarationError, DeclarationErrorKind, OrmError, OrmResult, PoolError, QueryError,
};
pub use model::RecordType;
pub use query::{
    ComparisonOperator, JoinClause, JoinKind, LimitClause, OrderDirection, Predicate,
    QueryExpression,
};
pub use relationships::{
    build_join, compile_joins, DeclarationOutcome, PivotConfig, Registry, Relationship,
    RelationshipCondition, RelationshipHop, RelationshipKind, RelationshipOptions,
    ResolutionTask,
};
