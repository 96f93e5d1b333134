//! Record type definitions - schema-facing metadata for a mapped entity
//!
//! A `RecordType` names an entity, maps attributes to storage columns and
//! owns the relationship map keyed by relationship name. Relationships may
//! be added incrementally, including after resolution has started.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::relationships::metadata::Relationship;

/// A named record type with its column mapping and primary key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordType {
    /// Type name, e.g. "User"
    name: String,

    /// Storage table name, e.g. "users"
    table: String,

    /// Attribute name -> storage column
    columns: HashMap<String, String>,

    /// Primary key attribute set, in declaration order
    primary_key: Vec<String>,

    /// Relationship name -> resolved relationship (last write wins)
    #[serde(skip)]
    relationships: HashMap<String, Relationship>,
}

impl RecordType {
    /// Create a record type with the conventional `id` primary key
    pub fn new(name: &str, table: &str) -> Self {
        let mut columns = HashMap::new();
        columns.insert("id".to_string(), "id".to_string());
        Self {
            name: name.to_string(),
            table: table.to_string(),
            columns,
            primary_key: vec!["id".to_string()],
            relationships: HashMap::new(),
        }
    }

    /// Map an attribute to a storage column
    pub fn with_column(mut self, attribute: &str, column: &str) -> Self {
        self.columns
            .insert(attribute.to_string(), column.to_string());
        self
    }

    /// Replace the primary key attribute set
    pub fn with_primary_key(mut self, attributes: Vec<String>) -> Self {
        for attribute in &attributes {
            self.columns
                .entry(attribute.clone())
                .or_insert_with(|| attribute.clone());
        }
        self.primary_key = attributes;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Storage column for an attribute, if mapped
    pub fn column_for(&self, attribute: &str) -> Option<&str> {
        self.columns.get(attribute).map(|c| c.as_str())
    }

    /// Storage column of the first primary key attribute
    pub fn primary_key_column(&self) -> &str {
        let attribute = self.primary_key.first().map(|a| a.as_str()).unwrap_or("id");
        self.column_for(attribute).unwrap_or(attribute)
    }

    pub fn primary_key(&self) -> &[String] {
        &self.primary_key
    }

    /// Look up a resolved relationship by name
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.relationships.get(name)
    }

    pub fn has_relationship(&self, name: &str) -> bool {
        self.relationships.contains_key(name)
    }

    pub fn relationship_names(&self) -> Vec<String> {
        self.relationships.keys().cloned().collect()
    }

    /// Insert a resolved relationship, overwriting any prior declaration of
    /// the same name
    pub fn add_relationship(&mut self, relationship: Relationship) {
        self.relationships
            .insert(relationship.name.clone(), relationship);
    }
}

/// Lowercase a type name at word boundaries, e.g. "UserGroup" -> "user_group".
/// Used for conventional foreign key defaults.
pub(crate) fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_type_defaults() {
        let user = RecordType::new("User", "users");
        assert_eq!(user.name(), "User");
        assert_eq!(user.table(), "users");
        assert_eq!(user.primary_key_column(), "id");
        assert_eq!(user.column_for("id"), Some("id"));
    }

    #[test]
    fn test_column_mapping() {
        let user = RecordType::new("User", "users")
            .with_column("email_address", "email")
            .with_column("name", "full_name");

        assert_eq!(user.column_for("email_address"), Some("email"));
        assert_eq!(user.column_for("name"), Some("full_name"));
        assert_eq!(user.column_for("missing"), None);
    }

    #[test]
    fn test_custom_primary_key() {
        let user = RecordType::new("User", "users")
            .with_column("uuid", "uuid")
            .with_primary_key(vec!["uuid".to_string()]);

        assert_eq!(user.primary_key(), &["uuid".to_string()]);
        assert_eq!(user.primary_key_column(), "uuid");
    }

    #[test]
    fn test_composite_primary_key_uses_first_column() {
        let membership = RecordType::new("Membership", "memberships")
            .with_primary_key(vec!["user_id".to_string(), "group_id".to_string()]);

        assert_eq!(membership.primary_key_column(), "user_id");
        assert_eq!(membership.column_for("group_id"), Some("group_id"));
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("User"), "user");
        assert_eq!(snake_case("UserGroup"), "user_group");
        assert_eq!(snake_case("privilege"), "privilege");
    }
}
