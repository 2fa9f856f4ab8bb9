//! Record store contract
//!
//! Trips, reservations and the other persisted records live in a remote table
//! store. Lookups never touch it; the surrounding application does, through
//! the [`RecordStore`] trait and its classified [`StoreError`]s.

mod error;
mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;

/// A stored row: field name to JSON value
pub type Record = serde_json::Map<String, Value>;

/// Comparison applied by a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// One `field <op> value` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

/// Conjunction of conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub conditions: Vec<Condition>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Eq, value)
    }

    pub fn neq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Neq, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, FilterOp::Lte, value)
    }

    /// Whether a record satisfies every condition
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|c| {
            let field = record.get(&c.field).unwrap_or(&Value::Null);
            match c.op {
                FilterOp::Eq => field == &c.value,
                FilterOp::Neq => field != &c.value,
                FilterOp::Gt => compare_values(field, &c.value) == Some(Ordering::Greater),
                FilterOp::Gte => matches!(
                    compare_values(field, &c.value),
                    Some(Ordering::Greater | Ordering::Equal)
                ),
                FilterOp::Lt => compare_values(field, &c.value) == Some(Ordering::Less),
                FilterOp::Lte => matches!(
                    compare_values(field, &c.value),
                    Some(Ordering::Less | Ordering::Equal)
                ),
            }
        })
    }
}

/// Sort order for reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOrder {
    pub field: String,
    pub ascending: bool,
}

impl RecordOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: true,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ascending: false,
        }
    }

    /// Compare two records; records missing the field sort last
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ordering = match (a.get(&self.field), b.get(&self.field)) {
            (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
            (Some(_), None) => return Ordering::Less,
            (None, Some(_)) => return Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// Order two JSON scalars of the same kind
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Table-oriented persistence used by the application's CRUD services
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a record, returning it as stored
    async fn create_record(&self, table: &str, data: Record) -> StoreResult<Record>;

    /// Records matching `filter`, optionally sorted
    async fn read_records(
        &self,
        table: &str,
        filter: &RecordFilter,
        order: Option<&RecordOrder>,
    ) -> StoreResult<Vec<Record>>;

    /// Apply `patch` to the record with `id`
    async fn update_record(&self, table: &str, id: &str, patch: Record) -> StoreResult<Record>;

    async fn delete_record(&self, table: &str, id: &str) -> StoreResult<()>;

    /// The record with `id`, or `NotFound`
    async fn read_record(&self, table: &str, id: &str) -> StoreResult<Record> {
        let filter = RecordFilter::new().eq("id", id);
        self.read_records(table, &filter, None)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", table, id)))
    }
}
