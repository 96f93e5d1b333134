//! Query expression LIMIT/OFFSET operations

use crate::error::QueryError;

use super::builder::QueryExpression;
use super::types::LimitClause;

impl QueryExpression {
    /// Set the row limit and optional offset, returning a new expression
    pub fn with_limit(&self, count: i64, offset: Option<i64>) -> Result<Self, QueryError> {
        if count <= 0 {
            return Err(QueryError::InvalidLimit(count));
        }
        if let Some(offset) = offset {
            if offset < 0 {
                return Err(QueryError::InvalidOffset(offset));
            }
        }
        let mut next = self.clone();
        next.limit = Some(LimitClause { count, offset });
        Ok(next)
    }

    /// Page-based pagination (LIMIT per_page OFFSET (page - 1) * per_page)
    pub fn paginate(&self, per_page: i64, page: i64) -> Result<Self, QueryError> {
        if page < 1 {
            return Err(QueryError::InvalidOffset(page - 1));
        }
        self.with_limit(per_page, Some((page - 1) * per_page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_limit() {
        let expr = QueryExpression::from_table("users")
            .unwrap()
            .with_limit(10, Some(20))
            .unwrap();
        assert_eq!(
            expr.limit(),
            Some(LimitClause {
                count: 10,
                offset: Some(20)
            })
        );
    }

    #[test]
    fn test_invalid_limit_rejected() {
        let base = QueryExpression::from_table("users").unwrap();
        assert!(matches!(
            base.with_limit(0, None),
            Err(QueryError::InvalidLimit(0))
        ));
        assert!(matches!(
            base.with_limit(10, Some(-1)),
            Err(QueryError::InvalidOffset(-1))
        ));
    }

    #[test]
    fn test_paginate() {
        let expr = QueryExpression::from_table("users")
            .unwrap()
            .paginate(25, 3)
            .unwrap();
        assert_eq!(
            expr.limit(),
            Some(LimitClause {
                count: 25,
                offset: Some(50)
            })
        );
    }
}
