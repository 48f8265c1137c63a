//! Statement model: an inspectable representation of a pending query.
//!
//! Statements are opaque to callers (the engine executes them, the injector
//! rewrites them) but expose the metadata the classifier needs. The crucial
//! design point is `sources`: the set of entity types the statement reads
//! from or writes to, tracked independently of the projection. Aggregates
//! like `count(*)` have no column-level entity binding, so classification
//! must never be derived from selected columns.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityDef;

/// Generic runtime value for statement assignments, predicate operands,
/// and result rows. JSON-compatible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// JSON null.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON integer (signed 64-bit).
    Int(i64),
    /// JSON floating-point (64-bit IEEE 754).
    Float(f64),
    /// JSON string (UTF-8).
    String(String),
    /// JSON array (ordered sequence of values).
    Array(Vec<Value>),
    /// JSON object. Uses `BTreeMap` for deterministic ordering.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Whether this value is JSON null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

/// Kind of statement, mirroring the executable statement families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Row-returning or aggregate read.
    Select,
    /// Row insertion; values carried in the assignments.
    Insert,
    /// In-place update; new values carried in the assignments.
    Update,
    /// Row deletion.
    Delete,
}

/// Aggregate projections with no directly instantiable row type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// `count(*)` over the matching rows.
    Count,
    /// Numeric sum over a single column.
    Sum(&'static str),
}

/// What a select statement produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Full rows.
    Rows,
    /// A column subset.
    Columns(Vec<&'static str>),
    /// An aggregate value. Carries no column-level entity binding: target
    /// entities are resolved from the statement's sources.
    Aggregate(Aggregate),
}

/// Predicate comparison operators. Deliberately minimal: equality for the
/// tenant predicate, null checks for the soft-delete predicate, plus
/// whatever caller filters reuse them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Column equals the operand value.
    Eq,
    /// Column is null or absent.
    IsNull,
}

/// Entity-qualified filter predicate.
///
/// Qualification by entity name lets a join statement carry independent
/// predicates per source entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Name of the source entity this predicate applies to.
    pub entity: &'static str,
    /// Column the predicate tests.
    pub column: String,
    /// Comparison operator.
    pub comparison: Comparison,
    /// Operand for `Eq`; ignored for `IsNull`.
    pub value: Value,
}

impl Predicate {
    /// Equality predicate on `entity.column`.
    #[must_use]
    pub fn eq(entity: &'static str, column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            entity,
            column: column.into(),
            comparison: Comparison::Eq,
            value: value.into(),
        }
    }

    /// Null-check predicate on `entity.column`.
    #[must_use]
    pub fn is_null(entity: &'static str, column: impl Into<String>) -> Self {
        Self {
            entity,
            column: column.into(),
            comparison: Comparison::IsNull,
            value: Value::Null,
        }
    }
}

/// A pending statement against one or more entity types.
///
/// Fields are private: the filter injector is the only component that
/// mutates a built statement, through [`Statement::push_predicate`] and
/// [`Statement::set_assignment`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    sources: Vec<&'static EntityDef>,
    projection: Projection,
    predicates: Vec<Predicate>,
    assignments: Vec<(String, Value)>,
}

impl Statement {
    fn new(kind: StatementKind, entity: &'static EntityDef, projection: Projection) -> Self {
        Self {
            kind,
            sources: vec![entity],
            projection,
            predicates: Vec::new(),
            assignments: Vec::new(),
        }
    }

    /// Row-returning select over `entity`.
    #[must_use]
    pub fn select(entity: &'static EntityDef) -> Self {
        Self::new(StatementKind::Select, entity, Projection::Rows)
    }

    /// `count(*)` over `entity`. No selectable row type; the entity is
    /// carried only in the sources.
    #[must_use]
    pub fn count(entity: &'static EntityDef) -> Self {
        Self::new(
            StatementKind::Select,
            entity,
            Projection::Aggregate(Aggregate::Count),
        )
    }

    /// Numeric sum of `column` over `entity`.
    #[must_use]
    pub fn sum(entity: &'static EntityDef, column: &'static str) -> Self {
        Self::new(
            StatementKind::Select,
            entity,
            Projection::Aggregate(Aggregate::Sum(column)),
        )
    }

    /// Insert into `entity`; row values are added with [`Statement::set`].
    #[must_use]
    pub fn insert(entity: &'static EntityDef) -> Self {
        Self::new(StatementKind::Insert, entity, Projection::Rows)
    }

    /// Update against `entity`; new values are added with [`Statement::set`].
    #[must_use]
    pub fn update(entity: &'static EntityDef) -> Self {
        Self::new(StatementKind::Update, entity, Projection::Rows)
    }

    /// Delete against `entity`.
    #[must_use]
    pub fn delete(entity: &'static EntityDef) -> Self {
        Self::new(StatementKind::Delete, entity, Projection::Rows)
    }

    /// Joins another entity into the statement's sources.
    #[must_use]
    pub fn join(mut self, entity: &'static EntityDef) -> Self {
        if !self.sources.iter().any(|e| e.name == entity.name) {
            self.sources.push(entity);
        }
        self
    }

    /// Restricts the projection to a column subset.
    #[must_use]
    pub fn columns(mut self, columns: Vec<&'static str>) -> Self {
        self.projection = Projection::Columns(columns);
        self
    }

    /// Adds a caller-supplied filter predicate.
    #[must_use]
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Adds an insert/update assignment.
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// Statement kind.
    #[must_use]
    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    /// The selected-from entity set, including joined entities. This is
    /// the classifier's input; it is populated for every statement kind,
    /// aggregates included.
    #[must_use]
    pub fn sources(&self) -> &[&'static EntityDef] {
        &self.sources
    }

    /// The first source entity (the one the statement was built from).
    #[must_use]
    pub fn primary(&self) -> &'static EntityDef {
        self.sources[0]
    }

    /// Projection of a select statement.
    #[must_use]
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// All predicates, caller-supplied and injected.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Insert/update assignments.
    #[must_use]
    pub fn assignments(&self) -> &[(String, Value)] {
        &self.assignments
    }

    /// Looks up an assignment by column name.
    #[must_use]
    pub fn assignment(&self, column: &str) -> Option<&Value> {
        self.assignments
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    /// Appends an injected predicate. Used by the filter injector.
    pub fn push_predicate(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Inserts or overwrites an assignment. Used by the filter injector to
    /// stamp the tenant id on inserts.
    pub fn set_assignment(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        if let Some(slot) = self.assignments.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = value;
        } else {
            self.assignments.push((column, value));
        }
    }
}
