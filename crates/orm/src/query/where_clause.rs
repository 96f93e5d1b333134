//! Query expression predicate operations
//!
//! Predicates are conjunctive; each operation validates its column reference
//! at call time and returns a new expression.

use serde_json::Value;

use crate::error::QueryError;

use super::builder::QueryExpression;
use super::types::{validate_identifier, ComparisonOperator, Predicate};

impl QueryExpression {
    /// Append a predicate, returning a new expression. The column reference
    /// and the operand shape for the operator are both checked at call time:
    /// IN/NOT IN need a non-empty value list, BETWEEN exactly two values, and
    /// the single-valued operators a value.
    pub fn with_predicate(&self, predicate: Predicate) -> Result<Self, QueryError> {
        validate_identifier(&predicate.column)?;
        match predicate.operator {
            ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {}
            ComparisonOperator::In | ComparisonOperator::NotIn => {
                if predicate.values.is_empty() {
                    return Err(QueryError::EmptyValueList(predicate.column));
                }
            }
            ComparisonOperator::Between => {
                if predicate.values.len() != 2 {
                    return Err(QueryError::InvalidOperandCount(
                        predicate.column,
                        predicate.values.len(),
                    ));
                }
            }
            _ => {
                if predicate.value.is_none() {
                    return Err(QueryError::MissingValue(predicate.column));
                }
            }
        }
        Ok(self.push_predicate(predicate))
    }

    /// Equality predicate
    pub fn filter_eq<T: Into<Value>>(&self, column: &str, value: T) -> Result<Self, QueryError> {
        self.filter(column, ComparisonOperator::Equal, value)
    }

    /// Inequality predicate
    pub fn filter_ne<T: Into<Value>>(&self, column: &str, value: T) -> Result<Self, QueryError> {
        self.filter(column, ComparisonOperator::NotEqual, value)
    }

    /// Greater-than predicate
    pub fn filter_gt<T: Into<Value>>(&self, column: &str, value: T) -> Result<Self, QueryError> {
        self.filter(column, ComparisonOperator::GreaterThan, value)
    }

    /// Less-than predicate
    pub fn filter_lt<T: Into<Value>>(&self, column: &str, value: T) -> Result<Self, QueryError> {
        self.filter(column, ComparisonOperator::LessThan, value)
    }

    /// LIKE predicate
    pub fn filter_like(&self, column: &str, pattern: &str) -> Result<Self, QueryError> {
        self.filter(column, ComparisonOperator::Like, pattern)
    }

    /// Single-valued predicate with an explicit operator
    pub fn filter<T: Into<Value>>(
        &self,
        column: &str,
        operator: ComparisonOperator,
        value: T,
    ) -> Result<Self, QueryError> {
        self.with_predicate(Predicate {
            column: column.to_string(),
            operator,
            value: Some(value.into()),
            values: Vec::new(),
        })
    }

    /// IN predicate over a value list
    pub fn filter_in<T: Into<Value>>(
        &self,
        column: &str,
        values: Vec<T>,
    ) -> Result<Self, QueryError> {
        self.with_predicate(Predicate {
            column: column.to_string(),
            operator: ComparisonOperator::In,
            value: None,
            values: values.into_iter().map(|v| v.into()).collect(),
        })
    }

    /// IS NULL predicate
    pub fn filter_null(&self, column: &str) -> Result<Self, QueryError> {
        self.with_predicate(Predicate {
            column: column.to_string(),
            operator: ComparisonOperator::IsNull,
            value: None,
            values: Vec::new(),
        })
    }

    /// IS NOT NULL predicate
    pub fn filter_not_null(&self, column: &str) -> Result<Self, QueryError> {
        self.with_predicate(Predicate {
            column: column.to_string(),
            operator: ComparisonOperator::IsNotNull,
            value: None,
            values: Vec::new(),
        })
    }

    /// BETWEEN predicate
    pub fn filter_between<T: Into<Value>>(
        &self,
        column: &str,
        start: T,
        end: T,
    ) -> Result<Self, QueryError> {
        self.with_predicate(Predicate {
            column: column.to_string(),
            operator: ComparisonOperator::Between,
            value: None,
            values: vec![start.into(), end.into()],
        })
    }
}
