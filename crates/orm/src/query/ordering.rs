//! Query expression ORDER BY operations

use std::sync::Arc;

use crate::error::QueryError;

use super::builder::QueryExpression;
use super::types::{validate_identifier, OrderDirection};

impl QueryExpression {
    /// Append an ordering term, returning a new expression
    pub fn with_ordering(
        &self,
        column: &str,
        direction: OrderDirection,
    ) -> Result<Self, QueryError> {
        validate_identifier(column)?;
        let mut ordering = (*self.ordering).clone();
        ordering.push((column.to_string(), direction));
        let mut next = self.clone();
        next.ordering = Arc::new(ordering);
        Ok(next)
    }

    /// Append an ascending ordering term
    pub fn order_by(&self, column: &str) -> Result<Self, QueryError> {
        self.with_ordering(column, OrderDirection::Asc)
    }

    /// Append a descending ordering term
    pub fn order_by_desc(&self, column: &str) -> Result<Self, QueryError> {
        self.with_ordering(column, OrderDirection::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_preserves_term_order() {
        let expr = QueryExpression::from_table("users")
            .unwrap()
            .order_by("users.name")
            .unwrap()
            .order_by_desc("users.created_at")
            .unwrap();

        assert_eq!(
            expr.ordering(),
            &[
                ("users.name".to_string(), OrderDirection::Asc),
                ("users.created_at".to_string(), OrderDirection::Desc),
            ]
        );
    }

    #[test]
    fn test_ordering_does_not_mutate_parent() {
        let base = QueryExpression::from_table("users").unwrap();
        let _ordered = base.order_by("users.name").unwrap();
        assert!(base.ordering().is_empty());
    }
}
