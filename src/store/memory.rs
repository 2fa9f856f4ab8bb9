//! In-process record store

use super::{Record, RecordFilter, RecordOrder, RecordStore, StoreError, StoreResult};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Record store kept in memory, one row list per table.
///
/// Rows get a uuid `id` and a `created_at` timestamp when missing. Fields
/// declared required for a table must be present and non-null.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    required: HashMap<String, Vec<String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare fields every row of `table` must carry
    pub fn with_required(mut self, table: &str, fields: &[&str]) -> Self {
        self.required.insert(
            table.to_string(),
            fields.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    fn check_required(&self, table: &str, record: &Record) -> StoreResult<()> {
        let Some(fields) = self.required.get(table) else {
            return Ok(());
        };
        match fields
            .iter()
            .find(|f| record.get(*f).map_or(true, Value::is_null))
        {
            Some(field) => Err(StoreError::ConstraintViolation(format!(
                "null value in column \"{}\" of {}",
                field, table
            ))),
            None => Ok(()),
        }
    }

    fn id_of(record: &Record) -> Option<&str> {
        record.get("id").and_then(Value::as_str)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_record(&self, table: &str, mut data: Record) -> StoreResult<Record> {
        let id = match Self::id_of(&data) {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        data.insert("id".to_string(), Value::String(id.clone()));
        data.entry("created_at")
            .or_insert_with(|| Value::String(chrono::Utc::now().to_rfc3339()));
        self.check_required(table, &data)?;

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|r| Self::id_of(r) == Some(id.as_str())) {
            return Err(StoreError::Duplicate(format!("{}/{}", table, id)));
        }

        rows.push(data.clone());
        Ok(data)
    }

    async fn read_records(
        &self,
        table: &str,
        filter: &RecordFilter,
        order: Option<&RecordOrder>,
    ) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| filter.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by(|a, b| order.compare(a, b));
        }

        Ok(rows)
    }

    async fn update_record(&self, table: &str, id: &str, patch: Record) -> StoreResult<Record> {
        if patch.get("id").is_some_and(|v| v.as_str() != Some(id)) {
            return Err(StoreError::ConstraintViolation(
                "id cannot be changed".to_string(),
            ));
        }

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let row = tables
            .get_mut(table)
            .and_then(|rows| rows.iter_mut().find(|r| Self::id_of(r) == Some(id)))
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", table, id)))?;

        let mut updated = row.clone();
        updated.extend(patch);
        updated.insert(
            "updated_at".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        self.check_required(table, &updated)?;

        *row = updated.clone();
        Ok(updated)
    }

    async fn delete_record(&self, table: &str, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", table, id)))?;

        let before = rows.len();
        rows.retain(|r| Self::id_of(r) != Some(id));
        if rows.len() == before {
            return Err(StoreError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }
}
