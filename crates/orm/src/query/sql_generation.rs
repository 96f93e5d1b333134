//! SQL emission for query expressions
//!
//! Emits PostgreSQL-style SELECT statements from the structural expression,
//! either with `$n` placeholders and a parameter list, or with values
//! inlined for logging and tests.

use serde_json::Value;

use super::builder::QueryExpression;
use super::types::{ComparisonOperator, JoinKind};

impl QueryExpression {
    /// Generate SQL with `$n` placeholders and the parameter list, in
    /// placeholder order. Parameters keep their JSON value types so the
    /// execution layer can bind them as booleans, numbers or text.
    pub fn to_sql_with_params(&self) -> (String, Vec<Value>) {
        let mut sql = self.render_head();
        let mut params = Vec::new();
        let mut counter = 1;

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            let mut rendered = Vec::with_capacity(self.predicates.len());
            for predicate in self.predicates.iter() {
                let clause = match predicate.operator {
                    ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                        format!("{} {}", predicate.column, predicate.operator)
                    }
                    ComparisonOperator::In | ComparisonOperator::NotIn => {
                        let placeholders: Vec<String> = predicate
                            .values
                            .iter()
                            .map(|value| {
                                params.push(value.clone());
                                let p = format!("${}", counter);
                                counter += 1;
                                p
                            })
                            .collect();
                        format!(
                            "{} {} ({})",
                            predicate.column,
                            predicate.operator,
                            placeholders.join(", ")
                        )
                    }
                    ComparisonOperator::Between => {
                        for value in predicate.values.iter().take(2) {
                            params.push(value.clone());
                        }
                        let clause = format!(
                            "{} BETWEEN ${} AND ${}",
                            predicate.column,
                            counter,
                            counter + 1
                        );
                        counter += 2;
                        clause
                    }
                    _ => {
                        let clause = format!(
                            "{} {} ${}",
                            predicate.column, predicate.operator, counter
                        );
                        if let Some(ref value) = predicate.value {
                            params.push(value.clone());
                        }
                        counter += 1;
                        clause
                    }
                };
                rendered.push(clause);
            }
            sql.push_str(&rendered.join(" AND "));
        }

        sql.push_str(&self.render_tail());
        (sql, params)
    }

    /// Generate SQL with values inlined
    pub fn to_sql(&self) -> String {
        let mut sql = self.render_head();

        if !self.predicates.is_empty() {
            sql.push_str(" WHERE ");
            let rendered: Vec<String> = self
                .predicates
                .iter()
                .map(|predicate| match predicate.operator {
                    ComparisonOperator::IsNull | ComparisonOperator::IsNotNull => {
                        format!("{} {}", predicate.column, predicate.operator)
                    }
                    ComparisonOperator::In | ComparisonOperator::NotIn => {
                        let values: Vec<String> =
                            predicate.values.iter().map(format_value).collect();
                        format!(
                            "{} {} ({})",
                            predicate.column,
                            predicate.operator,
                            values.join(", ")
                        )
                    }
                    ComparisonOperator::Between if predicate.values.len() == 2 => format!(
                        "{} BETWEEN {} AND {}",
                        predicate.column,
                        format_value(&predicate.values[0]),
                        format_value(&predicate.values[1])
                    ),
                    _ => {
                        let value = predicate
                            .value
                            .as_ref()
                            .map(format_value)
                            .unwrap_or_else(|| "NULL".to_string());
                        format!("{} {} {}", predicate.column, predicate.operator, value)
                    }
                })
                .collect();
            sql.push_str(&rendered.join(" AND "));
        }

        sql.push_str(&self.render_tail());
        sql
    }

    /// SELECT, FROM and JOIN clauses
    fn render_head(&self) -> String {
        let mut sql = String::from("SELECT ");

        if self.projections.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.projections.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.source);

        for join in self.joins.iter() {
            sql.push_str(&format!(" {} {}", join.kind, join.table));
            if join.kind != JoinKind::Cross && !join.on.is_empty() {
                sql.push_str(" ON ");
                let conditions: Vec<String> = join
                    .on
                    .iter()
                    .map(|(left, right)| format!("{} = {}", left, right))
                    .collect();
                sql.push_str(&conditions.join(" AND "));
            }
        }

        sql
    }

    /// ORDER BY, LIMIT and OFFSET clauses
    fn render_tail(&self) -> String {
        let mut sql = String::new();

        if !self.ordering.is_empty() {
            sql.push_str(" ORDER BY ");
            let terms: Vec<String> = self
                .ordering
                .iter()
                .map(|(column, direction)| format!("{} {}", column, direction))
                .collect();
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit.count));
            if let Some(offset) = limit.offset {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        sql
    }
}

/// Inline a value for paramless emission, escaping single quotes
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "NULL".to_string(),
        _ => "NULL".to_string(),
    }
}
