//! Declares a schema whose relationships reference types defined later,
//! resolves it and prints the SQL for a through traversal. Set DATABASE_URL
//! to also run the query against a live PostgreSQL instance.

use quarry_orm::{
    create_pool, PoolConfig, QueryExpression, RecordType, Registry, RelationshipKind,
    RelationshipOptions,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = Registry::new();

    // User is defined first; everything it references comes later.
    registry.define_record_type(RecordType::new("User", "users"));
    registry.declare(
        "User",
        RelationshipKind::HasMany,
        "memberships",
        RelationshipOptions::to_target("Membership"),
    )?;
    registry.declare(
        "User",
        RelationshipKind::Through,
        "groups",
        RelationshipOptions::via("memberships").with_source("group"),
    )?;

    registry.define_record_type(RecordType::new("Membership", "memberships"));
    registry.declare(
        "Membership",
        RelationshipKind::BelongsTo,
        "group",
        RelationshipOptions::to_target("Group"),
    )?;
    registry.define_record_type(RecordType::new("Group", "groups"));

    println!("deferred before solve: {}", registry.deferred_count());
    registry.solve().map_err(|errors| errors[0].clone())?;
    println!("deferred after solve:  {}", registry.deferred_count());

    let base = QueryExpression::from_table("users")?.filter_eq("users.active", true)?;
    let groups = registry.join_for("User", "groups", &base)?;
    println!("{}", groups.to_sql());

    if let Ok(url) = std::env::var("DATABASE_URL") {
        let pool = create_pool(&url, &PoolConfig::default()).await?;
        let rows = quarry_orm::connection::fetch_expression(&pool, &groups).await?;
        println!("fetched {} rows", rows.len());
    }

    Ok(())
}
