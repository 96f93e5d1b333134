//! Association-to-join compiler
//!
//! Turns a resolved relationship into the join structure that traverses it:
//! a single clause for has/belongs relationships, a pivot pair for
//! many-to-many, and one clause per expanded hop for through chains.

use serde_json::Value;

use crate::error::{DeclarationError, OrmError, OrmResult};
use crate::model::{snake_case, RecordType};
use crate::query::builder::QueryExpression;
use crate::query::types::{ComparisonOperator, JoinClause, Predicate};

use super::metadata::{Relationship, RelationshipHop, RelationshipKind, RelationshipOptions};
use super::registry::Registry;

/// Compute the hop chain for a direct (non-through) relationship. Foreign
/// key defaults follow the `<type>_id` convention; both sides can be
/// overridden through the declaration options.
pub(crate) fn direct_hops(
    owner: &RecordType,
    target: &RecordType,
    kind: RelationshipKind,
    name: &str,
    options: &RelationshipOptions,
) -> Result<Vec<RelationshipHop>, DeclarationError> {
    match kind {
        RelationshipKind::HasOne | RelationshipKind::HasMany => {
            let foreign_key = options
                .foreign_key
                .clone()
                .unwrap_or_else(|| format!("{}_id", snake_case(owner.name())));
            let local_key = options
                .local_key
                .clone()
                .unwrap_or_else(|| owner.primary_key_column().to_string());
            Ok(vec![RelationshipHop::new(
                target.table(),
                owner.table(),
                &format!("{}.{}", target.table(), foreign_key),
                &format!("{}.{}", owner.table(), local_key),
            )])
        }
        RelationshipKind::BelongsTo => {
            let foreign_key = options
                .foreign_key
                .clone()
                .unwrap_or_else(|| format!("{}_id", snake_case(target.name())));
            let referenced_key = options
                .local_key
                .clone()
                .unwrap_or_else(|| target.primary_key_column().to_string());
            Ok(vec![RelationshipHop::new(
                target.table(),
                owner.table(),
                &format!("{}.{}", target.table(), referenced_key),
                &format!("{}.{}", owner.table(), foreign_key),
            )])
        }
        RelationshipKind::ManyToMany => {
            let pivot = options
                .pivot
                .as_ref()
                .ok_or_else(|| DeclarationError::missing_pivot(owner.name(), name, kind))?;
            let local_key = options
                .local_key
                .clone()
                .unwrap_or_else(|| owner.primary_key_column().to_string());
            Ok(vec![
                RelationshipHop::new(
                    &pivot.table,
                    owner.table(),
                    &format!("{}.{}", pivot.table, pivot.local_key),
                    &format!("{}.{}", owner.table(), local_key),
                ),
                RelationshipHop::new(
                    target.table(),
                    &pivot.table,
                    &format!("{}.{}", target.table(), target.primary_key_column()),
                    &format!("{}.{}", pivot.table, pivot.foreign_key),
                ),
            ])
        }
        // Through chains are expanded from already-resolved relationships
        RelationshipKind::Through => Ok(Vec::new()),
    }
}

/// Compile a resolved relationship into join clauses, verifying that every
/// hop joins from a table already introduced by the chain.
pub fn compile_joins(relationship: &Relationship) -> Result<Vec<JoinClause>, DeclarationError> {
    let Some(first) = relationship.hops.first() else {
        return Ok(Vec::new());
    };

    let mut available: Vec<&str> = vec![first.parent_table.as_str()];
    let mut clauses = Vec::with_capacity(relationship.hops.len());

    for hop in &relationship.hops {
        if !available.contains(&hop.parent_table.as_str()) {
            return Err(DeclarationError::no_path(
                &relationship.owner,
                &relationship.name,
                relationship.kind,
                &relationship.name,
                format!(
                    "hop '{}' joins from '{}', which is not on the chain",
                    hop.table, hop.parent_table
                ),
            ));
        }
        available.push(hop.table.as_str());
        clauses.push(JoinClause {
            kind: relationship.join_kind,
            table: hop.table.clone(),
            on: vec![(hop.left_column.clone(), hop.right_column.clone())],
        });
    }

    Ok(clauses)
}

/// Produce the expression that traverses `relationship` from `base`: the
/// compiled joins plus the relationship's conditions and default ordering.
/// The base expression is unchanged; a new expression is returned.
pub fn build_join(
    relationship: &Relationship,
    base: &QueryExpression,
) -> OrmResult<QueryExpression> {
    if let Some(first) = relationship.hops.first() {
        if base.source() != first.parent_table {
            return Err(DeclarationError::no_path(
                &relationship.owner,
                &relationship.name,
                relationship.kind,
                &relationship.name,
                format!(
                    "base query selects from '{}', expected '{}'",
                    base.source(),
                    first.parent_table
                ),
            )
            .into());
        }
    }

    let mut expression = base.clone();
    for clause in compile_joins(relationship)? {
        expression = expression.with_join(clause)?;
    }

    for condition in &relationship.conditions {
        let column = qualify(&relationship.target_table, &condition.column);
        let predicate = match (condition.operator, &condition.value) {
            (ComparisonOperator::In | ComparisonOperator::NotIn, Value::Array(items)) => {
                Predicate {
                    column,
                    operator: condition.operator,
                    value: None,
                    values: items.clone(),
                }
            }
            (ComparisonOperator::IsNull | ComparisonOperator::IsNotNull, _) => Predicate {
                column,
                operator: condition.operator,
                value: None,
                values: Vec::new(),
            },
            (_, value) => Predicate {
                column,
                operator: condition.operator,
                value: Some(value.clone()),
                values: Vec::new(),
            },
        };
        expression = expression.with_predicate(predicate)?;
    }

    for (column, direction) in &relationship.ordering {
        let column = qualify(&relationship.target_table, column);
        expression = expression.with_ordering(&column, *direction)?;
    }

    Ok(expression)
}

impl Registry {
    /// Traverse a named relationship of `owner` from a base expression
    pub fn join_for(
        &self,
        owner: &str,
        relationship: &str,
        base: &QueryExpression,
    ) -> OrmResult<QueryExpression> {
        let record = self
            .record_type(owner)
            .ok_or_else(|| OrmError::Schema(format!("record type '{}' is not defined", owner)))?;
        let relationship = record.relationship(relationship).ok_or_else(|| {
            OrmError::Schema(format!(
                "record type '{}' has no relationship '{}'",
                owner, relationship
            ))
        })?;
        build_join(relationship, base)
    }
}

/// Qualify an unqualified column against a table
fn qualify(table: &str, column: &str) -> String {
    if column.contains('.') {
        column.to_string()
    } else {
        format!("{}.{}", table, column)
    }
}
