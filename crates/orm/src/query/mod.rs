//! Query expression module - immutable, structurally-shared query building

pub mod builder;
pub mod joins;
pub mod ordering;
pub mod pagination;
pub mod sql_generation;
pub mod types;
pub mod where_clause;

// Re-export main types (minimal exports to avoid conflicts)
pub use builder::QueryExpression;
pub use types::{
    ComparisonOperator, JoinClause, JoinKind, LimitClause, OrderDirection, Predicate,
};
