//! Query expression - immutable structural representation of a query
//!
//! Every composition operation takes `&self` and returns a new expression.
//! Clause lists live behind `Arc` so a derived expression shares the parts
//! it did not change with its parent. Expressions built during schema setup
//! can therefore be read concurrently afterwards without locking.

use std::sync::Arc;

use crate::error::QueryError;

use super::types::{validate_identifier, JoinClause, LimitClause, OrderDirection, Predicate};

/// An immutable query expression over a source table
#[derive(Debug, Clone, PartialEq)]
pub struct QueryExpression {
    pub(crate) source: String,
    pub(crate) projections: Arc<Vec<String>>,
    pub(crate) joins: Arc<Vec<JoinClause>>,
    pub(crate) predicates: Arc<Vec<Predicate>>,
    pub(crate) ordering: Arc<Vec<(String, OrderDirection)>>,
    pub(crate) limit: Option<LimitClause>,
}

impl QueryExpression {
    /// Create an expression selecting from a source table
    pub fn from_table(source: &str) -> Result<Self, QueryError> {
        validate_identifier(source)?;
        Ok(Self {
            source: source.to_string(),
            projections: Arc::new(Vec::new()),
            joins: Arc::new(Vec::new()),
            predicates: Arc::new(Vec::new()),
            ordering: Arc::new(Vec::new()),
            limit: None,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn projections(&self) -> &[String] {
        &self.projections
    }

    pub fn joins(&self) -> &[JoinClause] {
        &self.joins
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn ordering(&self) -> &[(String, OrderDirection)] {
        &self.ordering
    }

    pub fn limit(&self) -> Option<LimitClause> {
        self.limit
    }

    /// Replace the projection list. Columns are validated at call time.
    pub fn with_projection(&self, columns: &[&str]) -> Result<Self, QueryError> {
        for column in columns {
            validate_identifier(column)?;
        }
        let mut next = self.clone();
        next.projections = Arc::new(columns.iter().map(|c| c.to_string()).collect());
        Ok(next)
    }

    /// Append a single projected column
    pub fn with_added_projection(&self, column: &str) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        let mut projections = (*self.projections).clone();
        projections.push(column.to_string());
        let mut next = self.clone();
        next.projections = Arc::new(projections);
        Ok(next)
    }

    pub(crate) fn push_predicate(&self, predicate: Predicate) -> Self {
        let mut predicates = (*self.predicates).clone();
        predicates.push(predicate);
        let mut next = self.clone();
        next.predicates = Arc::new(predicates);
        next
    }

    pub(crate) fn push_join(&self, clause: JoinClause) -> Self {
        let mut joins = (*self.joins).clone();
        joins.push(clause);
        let mut next = self.clone();
        next.joins = Arc::new(joins);
        next
    }
}
