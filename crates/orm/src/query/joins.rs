//! Query expression JOIN operations

use crate::error::QueryError;

use super::builder::QueryExpression;
use super::types::{validate_identifier, JoinClause, JoinKind};

impl QueryExpression {
    /// Append a join clause, returning a new expression. The clause is
    /// validated at call time: the table and every ON column must be well
    /// formed, and only cross joins may omit ON conditions.
    pub fn with_join(&self, clause: JoinClause) -> Result<Self, QueryError> {
        validate_identifier(&clause.table)?;
        if clause.on.is_empty() && clause.kind != JoinKind::Cross {
            return Err(QueryError::EmptyJoinCondition(clause.table));
        }
        for (left, right) in &clause.on {
            validate_identifier(left)?;
            validate_identifier(right)?;
        }
        Ok(self.push_join(clause))
    }

    /// Append an INNER JOIN on a column equality
    pub fn join(&self, table: &str, left: &str, right: &str) -> Result<Self, QueryError> {
        self.with_join(JoinClause::new(JoinKind::Inner, table, left, right))
    }

    /// Append a LEFT JOIN on a column equality
    pub fn left_join(&self, table: &str, left: &str, right: &str) -> Result<Self, QueryError> {
        self.with_join(JoinClause::new(JoinKind::Left, table, left, right))
    }

    /// Append a RIGHT JOIN on a column equality
    pub fn right_join(&self, table: &str, left: &str, right: &str) -> Result<Self, QueryError> {
        self.with_join(JoinClause::new(JoinKind::Right, table, left, right))
    }
}
