//! Relationship system - declaration, deferred resolution and join compilation

pub mod joins;
pub mod metadata;
pub mod registry;
pub mod resolver;

#[cfg(test)]
mod solver_tests;

// Re-export main types
pub use joins::{build_join, compile_joins};
pub use metadata::{
    PivotConfig, Relationship, RelationshipCondition, RelationshipHop, RelationshipKind,
    RelationshipOptions,
};
pub use registry::{DeclarationOutcome, Registry, ResolutionTask};
