//! End-to-end resolver scenarios: schemas whose relationship declarations
//! reference types defined later in the loading unit.

use crate::model::RecordType;
use crate::query::QueryExpression;

use super::metadata::{RelationshipKind, RelationshipOptions};
use super::registry::{DeclarationOutcome, Registry, ResolutionMode};

/// Declares the User -> UserGroup -> Group -> Privilege schema with User
/// first, so every relationship that looks forward defers.
fn declare_forward_referencing_schema() -> Registry {
    let mut registry = Registry::new();

    registry.define_record_type(RecordType::new("User", "users"));
    registry
        .declare(
            "User",
            RelationshipKind::HasMany,
            "user_groups",
            RelationshipOptions::to_target("UserGroup"),
        )
        .unwrap();
    registry
        .declare(
            "User",
            RelationshipKind::Through,
            "groups",
            RelationshipOptions::via("user_groups").with_source("group"),
        )
        .unwrap();
    registry
        .declare(
            "User",
            RelationshipKind::Through,
            "privileges",
            RelationshipOptions::via("groups"),
        )
        .unwrap();

    registry.define_record_type(RecordType::new("UserGroup", "user_groups"));
    registry
        .declare(
            "UserGroup",
            RelationshipKind::BelongsTo,
            "user",
            RelationshipOptions::to_target("User"),
        )
        .unwrap();
    registry
        .declare(
            "UserGroup",
            RelationshipKind::BelongsTo,
            "group",
            RelationshipOptions::to_target("Group"),
        )
        .unwrap();

    registry.define_record_type(RecordType::new("Group", "groups"));
    registry
        .declare(
            "Group",
            RelationshipKind::HasMany,
            "privileges",
            RelationshipOptions::to_target("Privilege"),
        )
        .unwrap();

    registry.define_record_type(RecordType::new("Privilege", "privileges"));
    registry
}

/// Same schema declared leaf-first, so nothing needs to defer.
fn declare_leaf_first_schema() -> Registry {
    let mut registry = Registry::new();

    registry.define_record_type(RecordType::new("Privilege", "privileges"));
    registry.define_record_type(RecordType::new("Group", "groups"));
    registry
        .declare(
            "Group",
            RelationshipKind::HasMany,
            "privileges",
            RelationshipOptions::to_target("Privilege"),
        )
        .unwrap();

    registry.define_record_type(RecordType::new("UserGroup", "user_groups"));
    registry
        .declare(
            "UserGroup",
            RelationshipKind::BelongsTo,
            "group",
            RelationshipOptions::to_target("Group"),
        )
        .unwrap();

    registry.define_record_type(RecordType::new("User", "users"));
    registry
        .declare(
            "UserGroup",
            RelationshipKind::BelongsTo,
            "user",
            RelationshipOptions::to_target("User"),
        )
        .unwrap();
    registry
        .declare(
            "User",
            RelationshipKind::HasMany,
            "user_groups",
            RelationshipOptions::to_target("UserGroup"),
        )
        .unwrap();
    registry
        .declare(
            "User",
            RelationshipKind::Through,
            "groups",
            RelationshipOptions::via("user_groups").with_source("group"),
        )
        .unwrap();
    registry
        .declare(
            "User",
            RelationshipKind::Through,
            "privileges",
            RelationshipOptions::via("groups"),
        )
        .unwrap();
    registry
}

#[test]
fn test_forward_references_defer_then_resolve() {
    let mut registry = declare_forward_referencing_schema();
    assert!(registry.deferred_count() > 0);

    registry.solve().unwrap();
    assert_eq!(registry.deferred_count(), 0);

    let user = registry.record_type("User").unwrap();
    assert!(user.has_relationship("user_groups"));
    assert!(user.has_relationship("groups"));
    assert!(user.has_relationship("privileges"));
}

#[test]
fn test_privileges_chain_expands_through_user_groups_and_groups() {
    let mut registry = declare_forward_referencing_schema();
    registry.solve().unwrap();

    let privileges = registry
        .record_type("User")
        .unwrap()
        .relationship("privileges")
        .unwrap();
    assert_eq!(privileges.target_model, "Privilege");

    let tables: Vec<&str> = privileges.hops.iter().map(|h| h.table.as_str()).collect();
    assert_eq!(tables, ["user_groups", "groups", "privileges"]);

    let base = QueryExpression::from_table("users").unwrap();
    let expr = registry.join_for("User", "privileges", &base).unwrap();
    assert_eq!(
        expr.to_sql(),
        "SELECT * FROM users \
         INNER JOIN user_groups ON user_groups.user_id = users.id \
         INNER JOIN groups ON groups.id = user_groups.group_id \
         INNER JOIN privileges ON privileges.group_id = groups.id"
    );
}

#[test]
fn test_each_pass_strictly_shrinks_the_queue_until_empty() {
    // Drive the passes by hand: on a resolvable schema every pass over the
    // deferred queue must make progress, so the count strictly decreases.
    let mut registry = declare_forward_referencing_schema();
    let mut previous = registry.deferred_count();
    assert!(previous > 0);

    while registry.deferred_count() > 0 {
        for task in registry.take_deferred() {
            let _ = registry.attempt(task, ResolutionMode::Deferring);
        }
        let remaining = registry.deferred_count();
        assert!(remaining < previous, "pass left {} of {}", remaining, previous);
        previous = remaining;
    }

    assert!(registry
        .record_type("User")
        .unwrap()
        .has_relationship("privileges"));
}

#[test]
fn test_declaration_order_does_not_change_final_graph() {
    let mut forward = declare_forward_referencing_schema();
    forward.solve().unwrap();

    let mut leaf_first = declare_leaf_first_schema();
    // Everything resolved eagerly; solve is a no-op fixed point.
    assert_eq!(leaf_first.deferred_count(), 0);
    leaf_first.solve().unwrap();

    for record in ["User", "UserGroup", "Group"] {
        let a = forward.record_type(record).unwrap();
        let b = leaf_first.record_type(record).unwrap();
        let mut names_a = a.relationship_names();
        let mut names_b = b.relationship_names();
        names_a.sort();
        names_b.sort();
        assert_eq!(names_a, names_b);
        for name in &names_a {
            assert_eq!(a.relationship(name), b.relationship(name), "{}", name);
        }
    }
}

#[test]
fn test_deterministic_error_order_across_equivalent_registries() {
    let build = || {
        let mut registry = Registry::new();
        registry.define_record_type(RecordType::new("User", "users"));
        registry
            .declare(
                "User",
                RelationshipKind::HasMany,
                "widgets",
                RelationshipOptions::to_target("Widget"),
            )
            .unwrap();
        registry
            .declare(
                "User",
                RelationshipKind::HasOne,
                "avatar",
                RelationshipOptions::to_target("Avatar"),
            )
            .unwrap();
        registry
            .declare(
                "User",
                RelationshipKind::Through,
                "gadgets",
                RelationshipOptions::via("widgets"),
            )
            .unwrap();
        registry
    };

    let errors_a = build().solve().unwrap_err();
    let errors_b = build().solve().unwrap_err();
    assert_eq!(errors_a, errors_b);
    assert_eq!(errors_a.len(), 3);
}

#[test]
fn test_partial_schema_reports_only_broken_declarations() {
    let mut registry = declare_forward_referencing_schema();
    registry
        .declare(
            "User",
            RelationshipKind::HasMany,
            "sessions",
            RelationshipOptions::to_target("Session"),
        )
        .unwrap();

    let errors = registry.solve().unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].relationship, "sessions");

    // The healthy part of the schema still resolved completely.
    assert!(registry
        .record_type("User")
        .unwrap()
        .has_relationship("privileges"));
}

#[test]
fn test_declared_after_solve_resolves_on_next_solve() {
    let mut registry = declare_forward_referencing_schema();
    registry.solve().unwrap();

    registry
        .declare(
            "Privilege",
            RelationshipKind::HasMany,
            "audit_events",
            RelationshipOptions::to_target("AuditEvent"),
        )
        .unwrap();
    assert_eq!(registry.deferred_count(), 1);

    registry.define_record_type(RecordType::new("AuditEvent", "audit_events"));
    registry.solve().unwrap();
    assert!(registry
        .record_type("Privilege")
        .unwrap()
        .has_relationship("audit_events"));
}

#[test]
fn test_shared_base_expression_reused_across_relationship_scopes() {
    let mut registry = declare_forward_referencing_schema();
    registry.solve().unwrap();

    let base = QueryExpression::from_table("users")
        .unwrap()
        .filter_eq("users.active", true)
        .unwrap();

    let groups = registry.join_for("User", "groups", &base).unwrap();
    let privileges = registry.join_for("User", "privileges", &base).unwrap();

    // The shared base is untouched by either derived scope.
    assert!(base.joins().is_empty());
    assert_eq!(base.predicates().len(), 1);
    assert_eq!(groups.joins().len(), 2);
    assert_eq!(privileges.joins().len(), 3);
    assert_eq!(groups.predicates().len(), 1);
}
