//! Query expression types - clause and predicate building blocks

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::QueryError;

/// Comparison operators for predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
    NotLike,
    In,
    NotIn,
    IsNull,
    IsNotNull,
    Between,
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOperator::Equal => write!(f, "="),
            ComparisonOperator::NotEqual => write!(f, "!="),
            ComparisonOperator::GreaterThan => write!(f, ">"),
            ComparisonOperator::GreaterThanOrEqual => write!(f, ">="),
            ComparisonOperator::LessThan => write!(f, "<"),
            ComparisonOperator::LessThanOrEqual => write!(f, "<="),
            ComparisonOperator::Like => write!(f, "LIKE"),
            ComparisonOperator::NotLike => write!(f, "NOT LIKE"),
            ComparisonOperator::In => write!(f, "IN"),
            ComparisonOperator::NotIn => write!(f, "NOT IN"),
            ComparisonOperator::IsNull => write!(f, "IS NULL"),
            ComparisonOperator::IsNotNull => write!(f, "IS NOT NULL"),
            ComparisonOperator::Between => write!(f, "BETWEEN"),
        }
    }
}

/// A single conjunctive predicate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub operator: ComparisonOperator,
    pub value: Option<Value>,
    /// Operand list for IN, NOT IN and BETWEEN
    pub values: Vec<Value>,
}

/// Join kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinKind::Inner => write!(f, "INNER JOIN"),
            JoinKind::Left => write!(f, "LEFT JOIN"),
            JoinKind::Right => write!(f, "RIGHT JOIN"),
            JoinKind::Full => write!(f, "FULL JOIN"),
            JoinKind::Cross => write!(f, "CROSS JOIN"),
        }
    }
}

/// A join clause against a target table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: String,
    /// ON conditions as (left column, right column) equality pairs.
    /// Empty only for cross joins.
    pub on: Vec<(String, String)>,
}

impl JoinClause {
    pub fn new(kind: JoinKind, table: &str, left: &str, right: &str) -> Self {
        Self {
            kind,
            table: table.to_string(),
            on: vec![(left.to_string(), right.to_string())],
        }
    }

    pub fn cross(table: &str) -> Self {
        Self {
            kind: JoinKind::Cross,
            table: table.to_string(),
            on: Vec::new(),
        }
    }
}

/// Order by direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    Asc,
    Desc,
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "ASC"),
            OrderDirection::Desc => write!(f, "DESC"),
        }
    }
}

/// Row count limit with optional offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitClause {
    pub count: i64,
    pub offset: Option<i64>,
}

/// Validate a column or table reference at composition time. Dotted
/// qualification (`table.column`) is accepted; each segment must be a plain
/// identifier. `*` is accepted as a bare projection.
pub(crate) fn validate_identifier(reference: &str) -> Result<(), QueryError> {
    if reference.is_empty() {
        return Err(QueryError::EmptyColumn);
    }
    if reference == "*" {
        return Ok(());
    }
    for segment in reference.split('.') {
        let mut chars = segment.chars();
        let valid = match chars.next() {
            Some(first) if first.is_ascii_alphabetic() || first == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(QueryError::InvalidIdentifier(reference.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_display() {
        assert_eq!(ComparisonOperator::Equal.to_string(), "=");
        assert_eq!(ComparisonOperator::In.to_string(), "IN");
        assert_eq!(ComparisonOperator::IsNull.to_string(), "IS NULL");
    }

    #[test]
    fn test_join_kind_display() {
        assert_eq!(JoinKind::Inner.to_string(), "INNER JOIN");
        assert_eq!(JoinKind::Left.to_string(), "LEFT JOIN");
        assert_eq!(JoinKind::Cross.to_string(), "CROSS JOIN");
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("users").is_ok());
        assert!(validate_identifier("users.id").is_ok());
        assert!(validate_identifier("_private").is_ok());
        assert!(validate_identifier("*").is_ok());

        assert_eq!(validate_identifier(""), Err(QueryError::EmptyColumn));
        assert!(validate_identifier("users.").is_err());
        assert!(validate_identifier(".id").is_err());
        assert!(validate_identifier("1users").is_err());
        assert!(validate_identifier("users; DROP TABLE").is_err());
    }
}
