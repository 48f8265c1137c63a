//! In-memory [`StatementEngine`] backed by [`DashMap`] tables.
//!
//! Executes single-entity statements by evaluating predicates over stored
//! rows. Used for development and tests; the production engine is an
//! external SQL collaborator. Table creation and row seeding are the
//! administrative path and do not pass through interceptors.

use dashmap::DashMap;
use tenantfence_core::{
    Aggregate, Comparison, EntityDef, Predicate, Projection, Statement, StatementKind, Value,
};

use async_trait::async_trait;

use super::{EngineError, Row, StatementEngine, StatementOutcome};

/// In-memory table store keyed by entity name.
pub struct MemoryEngine {
    tables: DashMap<&'static str, Vec<Row>>,
}

impl MemoryEngine {
    /// Creates an engine with no tables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Creates (or resets) the backing table for `entity`. Administrative
    /// path: schema setup bypasses the interception hook.
    pub fn create_table(&self, entity: &'static EntityDef) {
        self.tables.insert(entity.name, Vec::new());
    }

    /// Appends a row without any filtering or stamping. Administrative
    /// path for seeding and tests.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEntity`] when the table was never
    /// created.
    pub fn seed_row(&self, entity: &'static EntityDef, row: Row) -> Result<(), EngineError> {
        let mut table = self
            .tables
            .get_mut(entity.name)
            .ok_or(EngineError::UnknownEntity(entity.name))?;
        table.push(row);
        Ok(())
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `row` satisfies every predicate qualified to `entity`.
fn row_matches(row: &Row, predicates: &[Predicate], entity: &'static str) -> bool {
    predicates
        .iter()
        .filter(|p| p.entity == entity)
        .all(|p| match p.comparison {
            Comparison::Eq => row.get(&p.column) == Some(&p.value),
            Comparison::IsNull => row.get(&p.column).map_or(true, Value::is_null),
        })
}

/// Projects a row down to a column subset.
fn project(row: &Row, columns: &[&'static str]) -> Row {
    columns
        .iter()
        .filter_map(|c| row.get(*c).map(|v| ((*c).to_owned(), v.clone())))
        .collect()
}

fn sum_column(rows: &[&Row], column: &'static str) -> Result<f64, EngineError> {
    let mut total = 0.0;
    for row in rows {
        match row.get(column) {
            #[allow(clippy::cast_precision_loss)]
            Some(Value::Int(i)) => total += *i as f64,
            Some(Value::Float(f)) => total += f,
            None | Some(Value::Null) => {}
            Some(_) => {
                return Err(EngineError::NonNumericColumn {
                    column: column.to_owned(),
                })
            }
        }
    }
    Ok(total)
}

#[async_trait]
impl StatementEngine for MemoryEngine {
    async fn execute(&self, statement: Statement) -> Result<StatementOutcome, EngineError> {
        if statement.sources().len() > 1 {
            return Err(EngineError::JoinUnsupported);
        }
        let entity = statement.primary();

        match statement.kind() {
            StatementKind::Select => {
                let table = self
                    .tables
                    .get(entity.name)
                    .ok_or(EngineError::UnknownEntity(entity.name))?;
                let matching: Vec<&Row> = table
                    .iter()
                    .filter(|row| row_matches(row, statement.predicates(), entity.name))
                    .collect();

                match statement.projection() {
                    Projection::Aggregate(Aggregate::Count) => {
                        Ok(StatementOutcome::Count(matching.len() as u64))
                    }
                    Projection::Aggregate(Aggregate::Sum(column)) => {
                        Ok(StatementOutcome::Sum(sum_column(&matching, column)?))
                    }
                    Projection::Columns(columns) => Ok(StatementOutcome::Rows(
                        matching.iter().map(|row| project(row, columns)).collect(),
                    )),
                    Projection::Rows => Ok(StatementOutcome::Rows(
                        matching.into_iter().cloned().collect(),
                    )),
                }
            }
            StatementKind::Insert => {
                let row: Row = statement
                    .assignments()
                    .iter()
                    .map(|(c, v)| (c.clone(), v.clone()))
                    .collect();
                let mut table = self
                    .tables
                    .get_mut(entity.name)
                    .ok_or(EngineError::UnknownEntity(entity.name))?;
                table.push(row);
                Ok(StatementOutcome::Inserted)
            }
            StatementKind::Update => {
                let mut table = self
                    .tables
                    .get_mut(entity.name)
                    .ok_or(EngineError::UnknownEntity(entity.name))?;
                let mut affected = 0u64;
                for row in table
                    .iter_mut()
                    .filter(|row| row_matches(row, statement.predicates(), entity.name))
                {
                    for (column, value) in statement.assignments() {
                        row.insert(column.clone(), value.clone());
                    }
                    affected += 1;
                }
                Ok(StatementOutcome::Affected(affected))
            }
            StatementKind::Delete => {
                let mut table = self
                    .tables
                    .get_mut(entity.name)
                    .ok_or(EngineError::UnknownEntity(entity.name))?;
                let before = table.len();
                table.retain(|row| !row_matches(row, statement.predicates(), entity.name));
                Ok(StatementOutcome::Affected((before - table.len()) as u64))
            }
        }
    }
}
