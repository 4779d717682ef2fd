use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{Filter, RecordKey, RecordStore};

type Table = HashMap<String, Value>;

/// Process-local store. Records are keyed by the string value of their key
/// attribute; scans walk the whole table.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map(HashMap::len).unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, table: &str, key: &RecordKey) -> Result<Option<Value>> {
        let tables = self.tables.read().await;
        let record = tables
            .get(table)
            .and_then(|t| t.get(&key.value))
            .filter(|record| record.get(&key.attribute).is_some())
            .cloned();
        Ok(record)
    }

    async fn put(&self, table: &str, key_attribute: &str, record: Value) -> Result<()> {
        let key = record
            .get(key_attribute)
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("Record is missing string key attribute '{}'", key_attribute))?
            .to_string();

        debug!("Putting {}[{}]", table, key);
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().insert(key, record);
        Ok(())
    }

    async fn scan(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let records = tables
            .get(table)
            .map(|t| {
                t.values()
                    .filter(|record| filters.iter().all(|f| f.matches(record)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    async fn update(&self, table: &str, key: &RecordKey, fields: Map<String, Value>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let Some(record) = tables.get_mut(table).and_then(|t| t.get_mut(&key.value)) else {
            debug!("No record {}[{}] to update", table, key.value);
            return Ok(false);
        };

        let object = record
            .as_object_mut()
            .ok_or_else(|| anyhow!("Stored record {}[{}] is not an object", table, key.value))?;
        object.extend(fields);
        Ok(true)
    }
}
