//! Relationship metadata - declaration options and resolved relationships

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{OrmError, OrmResult};
use crate::query::types::{ComparisonOperator, JoinKind, OrderDirection};

/// Kind of relationship between two record types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationshipKind {
    /// One-to-one, foreign key on the target
    HasOne,
    /// One-to-many, foreign key on the target
    HasMany,
    /// Many-to-one, foreign key on the owner
    BelongsTo,
    /// Many-to-many through a pivot table
    ManyToMany,
    /// Traversal through one or more intermediate relationships
    Through,
}

impl RelationshipKind {
    /// Returns true if this relationship returns a collection
    pub fn is_collection(self) -> bool {
        matches!(self, Self::HasMany | Self::ManyToMany | Self::Through)
    }

    /// Returns true if this relationship requires a pivot table
    pub fn requires_pivot(self) -> bool {
        matches!(self, Self::ManyToMany)
    }

    pub fn is_through(self) -> bool {
        matches!(self, Self::Through)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::HasOne => write!(f, "has_one"),
            RelationshipKind::HasMany => write!(f, "has_many"),
            RelationshipKind::BelongsTo => write!(f, "belongs_to"),
            RelationshipKind::ManyToMany => write!(f, "many_to_many"),
            RelationshipKind::Through => write!(f, "through"),
        }
    }
}

/// Pivot table configuration for many-to-many relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotConfig {
    /// The pivot table name
    pub table: String,

    /// Column in the pivot table referencing the owner
    pub local_key: String,

    /// Column in the pivot table referencing the target
    pub foreign_key: String,
}

impl PivotConfig {
    pub fn new(table: &str, local_key: &str, foreign_key: &str) -> Self {
        Self {
            table: table.to_string(),
            local_key: local_key.to_string(),
            foreign_key: foreign_key.to_string(),
        }
    }

    pub fn validate(&self) -> OrmResult<()> {
        if self.table.is_empty() {
            return Err(OrmError::Configuration(
                "pivot table name cannot be empty".to_string(),
            ));
        }
        if self.local_key.is_empty() || self.foreign_key.is_empty() {
            return Err(OrmError::Configuration(
                "pivot keys cannot be empty".to_string(),
            ));
        }
        if self.local_key == self.foreign_key {
            return Err(OrmError::Configuration(
                "pivot local key and foreign key must be different".to_string(),
            ));
        }
        Ok(())
    }
}

/// Extra join-scoped filter on a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipCondition {
    /// Column on the target table (unqualified)
    pub column: String,
    pub operator: ComparisonOperator,
    pub value: Value,
}

/// Typed declaration options. The recognized set of options per kind is
/// enforced by [`RelationshipOptions::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipOptions {
    /// Target record type name. Required for every kind except `Through`,
    /// where the chain determines the target (and a provided value is
    /// checked against it).
    pub target: Option<String>,

    /// Join kind override for compiled joins (defaults to inner)
    pub join_kind: Option<JoinKind>,

    /// Foreign key column override
    pub foreign_key: Option<String>,

    /// Local key column override (defaults to the owner's primary key)
    pub local_key: Option<String>,

    /// Pivot configuration, required for `ManyToMany`
    pub pivot: Option<PivotConfig>,

    /// Name of the relationship on the owner to traverse first,
    /// required for `Through`
    pub through: Option<String>,

    /// Name of the relationship on the intermediate type that completes the
    /// chain. Defaults to the declared relationship name.
    pub source: Option<String>,

    /// Default ordering applied when the relationship is compiled to joins
    pub ordering: Vec<(String, OrderDirection)>,

    /// Extra conditions applied to the target when compiled
    pub conditions: Vec<RelationshipCondition>,
}

impl RelationshipOptions {
    /// Options targeting a record type by name
    pub fn to_target(target: &str) -> Self {
        Self {
            target: Some(target.to_string()),
            ..Self::default()
        }
    }

    /// Options for a through declaration traversing `through` first
    pub fn via(through: &str) -> Self {
        Self {
            through: Some(through.to_string()),
            ..Self::default()
        }
    }

    pub fn with_join_kind(mut self, join_kind: JoinKind) -> Self {
        self.join_kind = Some(join_kind);
        self
    }

    pub fn with_foreign_key(mut self, foreign_key: &str) -> Self {
        self.foreign_key = Some(foreign_key.to_string());
        self
    }

    pub fn with_local_key(mut self, local_key: &str) -> Self {
        self.local_key = Some(local_key.to_string());
        self
    }

    pub fn with_pivot(mut self, pivot: PivotConfig) -> Self {
        self.pivot = Some(pivot);
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    pub fn with_target(mut self, target: &str) -> Self {
        self.target = Some(target.to_string());
        self
    }

    pub fn with_ordering(mut self, column: &str, direction: OrderDirection) -> Self {
        self.ordering.push((column.to_string(), direction));
        self
    }

    pub fn with_condition(
        mut self,
        column: &str,
        operator: ComparisonOperator,
        value: Value,
    ) -> Self {
        self.conditions.push(RelationshipCondition {
            column: column.to_string(),
            operator,
            value,
        });
        self
    }

    /// Check option consistency for a declaration kind. Violations are
    /// configuration errors and are never deferred.
    pub fn validate(&self, kind: RelationshipKind) -> OrmResult<()> {
        if kind.requires_pivot() && self.pivot.is_none() {
            return Err(OrmError::Configuration(format!(
                "{} relationships require a pivot configuration",
                kind
            )));
        }
        if !kind.requires_pivot() && self.pivot.is_some() {
            return Err(OrmError::Configuration(format!(
                "{} relationships do not accept a pivot configuration",
                kind
            )));
        }
        if let Some(ref pivot) = self.pivot {
            pivot.validate()?;
        }

        if kind.is_through() {
            if self.through.is_none() {
                return Err(OrmError::Configuration(
                    "through relationships require a 'through' option".to_string(),
                ));
            }
        } else {
            if self.through.is_some() || self.source.is_some() {
                return Err(OrmError::Configuration(format!(
                    "'through'/'source' options are only valid for through relationships, not {}",
                    kind
                )));
            }
            if self.target.is_none() {
                return Err(OrmError::Configuration(format!(
                    "{} relationships require a target record type",
                    kind
                )));
            }
        }
        Ok(())
    }
}

/// One join step in a resolved relationship chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipHop {
    /// Table joined by this hop
    pub table: String,

    /// Table this hop joins from (the base source or a prior hop's table)
    pub parent_table: String,

    /// Qualified column on `table`
    pub left_column: String,

    /// Qualified column on `parent_table`
    pub right_column: String,
}

impl RelationshipHop {
    pub fn new(table: &str, parent_table: &str, left_column: &str, right_column: &str) -> Self {
        Self {
            table: table.to_string(),
            parent_table: parent_table.to_string(),
            left_column: left_column.to_string(),
            right_column: right_column.to_string(),
        }
    }
}

/// A resolved relationship. Construction happens exactly once per successful
/// declaration; the target reference and through chain are memoized here as
/// concrete table and column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub kind: RelationshipKind,
    pub name: String,

    /// Owner record type name
    pub owner: String,

    /// Target record type name
    pub target_model: String,

    /// Target storage table
    pub target_table: String,

    /// Join kind used when compiling this relationship
    pub join_kind: JoinKind,

    /// Fully expanded join chain, in traversal order (at least one hop)
    pub hops: Vec<RelationshipHop>,

    /// Default ordering on the target, applied at compile time
    pub ordering: Vec<(String, OrderDirection)>,

    /// Extra conditions on the target, applied at compile time
    pub conditions: Vec<RelationshipCondition>,
}

impl Relationship {
    /// Returns true if traversal yields a collection
    pub fn is_collection(&self) -> bool {
        self.kind.is_collection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_properties() {
        assert!(RelationshipKind::HasMany.is_collection());
        assert!(RelationshipKind::ManyToMany.is_collection());
        assert!(!RelationshipKind::HasOne.is_collection());
        assert!(!RelationshipKind::BelongsTo.is_collection());

        assert!(RelationshipKind::ManyToMany.requires_pivot());
        assert!(!RelationshipKind::Through.requires_pivot());
        assert!(RelationshipKind::Through.is_through());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(RelationshipKind::HasMany.to_string(), "has_many");
        assert_eq!(RelationshipKind::BelongsTo.to_string(), "belongs_to");
        assert_eq!(RelationshipKind::Through.to_string(), "through");
    }

    #[test]
    fn test_many_to_many_requires_pivot() {
        let options = RelationshipOptions::to_target("Role");
        assert!(options.validate(RelationshipKind::ManyToMany).is_err());

        let options = options.with_pivot(PivotConfig::new("user_roles", "user_id", "role_id"));
        assert!(options.validate(RelationshipKind::ManyToMany).is_ok());
    }

    #[test]
    fn test_pivot_rejected_for_other_kinds() {
        let options = RelationshipOptions::to_target("Role")
            .with_pivot(PivotConfig::new("user_roles", "user_id", "role_id"));
        assert!(options.validate(RelationshipKind::HasMany).is_err());
    }

    #[test]
    fn test_through_requires_through_option() {
        assert!(RelationshipOptions::default()
            .validate(RelationshipKind::Through)
            .is_err());
        assert!(RelationshipOptions::via("groups")
            .validate(RelationshipKind::Through)
            .is_ok());
    }

    #[test]
    fn test_through_option_rejected_for_direct_kinds() {
        let options = RelationshipOptions::to_target("Group").with_source("group");
        assert!(options.validate(RelationshipKind::HasMany).is_err());
    }

    #[test]
    fn test_target_required_for_direct_kinds() {
        assert!(RelationshipOptions::default()
            .validate(RelationshipKind::HasMany)
            .is_err());
        assert!(RelationshipOptions::to_target("Post")
            .validate(RelationshipKind::HasMany)
            .is_ok());
    }

    #[test]
    fn test_pivot_validation() {
        assert!(PivotConfig::new("user_roles", "user_id", "role_id")
            .validate()
            .is_ok());
        assert!(PivotConfig::new("", "user_id", "role_id").validate().is_err());
        assert!(PivotConfig::new("user_roles", "id", "id").validate().is_err());
    }
}
