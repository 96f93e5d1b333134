//! Relationship declaration registry
//!
//! An explicit per-schema object: record types, the FIFO queue of deferred
//! declarations and the resolution mode. Each independently loaded schema
//! gets its own `Registry`; there is no process-wide instance.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::error::{DeclarationError, OrmError, OrmResult};
use crate::model::RecordType;
use crate::query::types::JoinKind;

use super::joins::direct_hops;
use super::metadata::{Relationship, RelationshipKind, RelationshipOptions};

/// Success variants of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationOutcome {
    /// The relationship was built and installed on its owner
    Resolved,
    /// Construction failed on a missing reference; a task was enqueued
    Deferred,
}

/// How the build step treats a resolution failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionMode {
    /// Failures enqueue a task and report `Deferred`
    #[default]
    Deferring,
    /// Failures are terminal
    Resolving,
}

/// Snapshot of one attempted relationship construction. Never mutated once
/// enqueued; re-attempts create fresh tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionTask {
    pub owner: String,
    pub kind: RelationshipKind,
    pub name: String,
    pub options: RelationshipOptions,
}

/// Per-schema registry of record types and relationship declarations
#[derive(Debug, Default)]
pub struct Registry {
    record_types: HashMap<String, RecordType>,
    deferred: VecDeque<ResolutionTask>,
    pub(crate) mode: ResolutionMode,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a record type known to the registry. Relationships may reference
    /// it from this point on; previously deferred declarations pick it up on
    /// the next `solve`.
    pub fn define_record_type(&mut self, record: RecordType) {
        self.record_types.insert(record.name().to_string(), record);
    }

    pub fn record_type(&self, name: &str) -> Option<&RecordType> {
        self.record_types.get(name)
    }

    pub fn has_record_type(&self, name: &str) -> bool {
        self.record_types.contains_key(name)
    }

    /// Number of declarations currently waiting for a missing reference
    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Remove and return every queued task, preserving enqueue order
    pub(crate) fn take_deferred(&mut self) -> Vec<ResolutionTask> {
        self.deferred.drain(..).collect()
    }

    /// Declare a relationship on `owner`.
    ///
    /// Option inconsistencies are configuration errors and always terminal.
    /// A missing target or an unconnectable through chain defers the
    /// declaration and returns `Ok(Deferred)` - unless the registry is
    /// resolving, in which case the failure propagates.
    pub fn declare(
        &mut self,
        owner: &str,
        kind: RelationshipKind,
        name: &str,
        options: RelationshipOptions,
    ) -> OrmResult<DeclarationOutcome> {
        options.validate(kind)?;
        if !self.record_types.contains_key(owner) {
            return Err(OrmError::Schema(format!(
                "record type '{}' is not defined",
                owner
            )));
        }
        let task = ResolutionTask {
            owner: owner.to_string(),
            kind,
            name: name.to_string(),
            options,
        };
        let mode = self.mode;
        self.attempt(task, mode).map_err(OrmError::from)
    }

    /// Build step shared by `declare` and the resolver. The mode is an
    /// explicit parameter: `Deferring` converts resolution failures into a
    /// queued task, `Resolving` propagates them.
    pub(crate) fn attempt(
        &mut self,
        task: ResolutionTask,
        mode: ResolutionMode,
    ) -> Result<DeclarationOutcome, DeclarationError> {
        match self.build_relationship(&task) {
            Ok(relationship) => {
                self.install(relationship);
                Ok(DeclarationOutcome::Resolved)
            }
            Err(error) => match mode {
                ResolutionMode::Deferring => {
                    debug!(
                        owner = %task.owner,
                        relationship = %task.name,
                        %error,
                        "deferring relationship declaration"
                    );
                    self.deferred.push_back(task);
                    Ok(DeclarationOutcome::Deferred)
                }
                ResolutionMode::Resolving => Err(error),
            },
        }
    }

    /// Insert a resolved relationship into its owner's map, last write wins
    fn install(&mut self, relationship: Relationship) {
        if let Some(owner) = self.record_types.get_mut(&relationship.owner) {
            owner.add_relationship(relationship);
        }
    }

    /// Construct a relationship from a task, resolving every reference it
    /// names. Pure with respect to registry state.
    pub(crate) fn build_relationship(
        &self,
        task: &ResolutionTask,
    ) -> Result<Relationship, DeclarationError> {
        let owner = self.record_types.get(&task.owner).ok_or_else(|| {
            DeclarationError::missing_target(&task.owner, &task.name, task.kind, &task.owner)
        })?;

        if task.kind.is_through() {
            self.build_through(owner, task)
        } else {
            self.build_direct(owner, task)
        }
    }

    /// Build a direct (non-through) relationship
    fn build_direct(
        &self,
        owner: &RecordType,
        task: &ResolutionTask,
    ) -> Result<Relationship, DeclarationError> {
        let target_name = task.options.target.as_deref().ok_or_else(|| {
            DeclarationError::missing_target(&task.owner, &task.name, task.kind, "(unspecified)")
        })?;
        let target = self.record_types.get(target_name).ok_or_else(|| {
            DeclarationError::missing_target(&task.owner, &task.name, task.kind, target_name)
        })?;

        let hops = direct_hops(owner, target, task.kind, &task.name, &task.options)?;

        Ok(Relationship {
            kind: task.kind,
            name: task.name.clone(),
            owner: owner.name().to_string(),
            target_model: target.name().to_string(),
            target_table: target.table().to_string(),
            join_kind: task.options.join_kind.unwrap_or(JoinKind::Inner),
            hops,
            ordering: task.options.ordering.clone(),
            conditions: task.options.conditions.clone(),
        })
    }

    /// Build a through relationship by chaining the owner's `through`
    /// relationship with the source relationship on the intermediate type.
    /// Both may themselves be through relationships; their hops are already
    /// fully expanded, so the chain concatenates.
    fn build_through(
        &self,
        owner: &RecordType,
        task: &ResolutionTask,
    ) -> Result<Relationship, DeclarationError> {
        let through_name = task.options.through.as_deref().ok_or_else(|| {
            DeclarationError::missing_target(&task.owner, &task.name, task.kind, "(unspecified)")
        })?;

        let through_rel = owner.relationship(through_name).ok_or_else(|| {
            DeclarationError::missing_target(&task.owner, &task.name, task.kind, through_name)
        })?;

        let intermediate = self
            .record_types
            .get(&through_rel.target_model)
            .ok_or_else(|| {
                DeclarationError::missing_target(
                    &task.owner,
                    &task.name,
                    task.kind,
                    &through_rel.target_model,
                )
            })?;

        let source_name = task.options.source.as_deref().unwrap_or(&task.name);
        let source_rel = intermediate.relationship(source_name).ok_or_else(|| {
            DeclarationError::no_path(
                &task.owner,
                &task.name,
                task.kind,
                through_name,
                format!(
                    "'{}' has no relationship '{}'",
                    intermediate.name(),
                    source_name
                ),
            )
        })?;

        if let Some(first) = source_rel.hops.first() {
            if first.parent_table != through_rel.target_table {
                return Err(DeclarationError::no_path(
                    &task.owner,
                    &task.name,
                    task.kind,
                    through_name,
                    format!(
                        "hop '{}' joins from '{}', expected '{}'",
                        first.table, first.parent_table, through_rel.target_table
                    ),
                ));
            }
        }

        if let Some(requested) = task.options.target.as_deref() {
            if requested != source_rel.target_model {
                return Err(DeclarationError::no_path(
                    &task.owner,
                    &task.name,
                    task.kind,
                    through_name,
                    format!(
                        "chain resolves to '{}', requested '{}'",
                        source_rel.target_model, requested
                    ),
                ));
            }
        }

        let mut hops = through_rel.hops.clone();
        hops.extend(source_rel.hops.iter().cloned());

        Ok(Relationship {
            kind: task.kind,
            name: task.name.clone(),
            owner: owner.name().to_string(),
            target_model: source_rel.target_model.clone(),
            target_table: source_rel.target_table.clone(),
            join_kind: task.options.join_kind.unwrap_or(JoinKind::Inner),
            hops,
            ordering: task.options.ordering.clone(),
            conditions: task.options.conditions.clone(),
        })
    }
}
