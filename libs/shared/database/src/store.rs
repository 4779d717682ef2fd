use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};

/// Primary key of a record: the attribute holding it and its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordKey {
    pub attribute: String,
    pub value: String,
}

impl RecordKey {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Equality predicate evaluated during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub attribute: String,
    pub value: String,
}

impl Filter {
    pub fn eq(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, record: &Value) -> bool {
        record
            .get(&self.attribute)
            .and_then(Value::as_str)
            .map(|v| v == self.value)
            .unwrap_or(false)
    }
}

/// Single-table key-value/document operations. Every call is atomic on one
/// record; nothing spans records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get(&self, table: &str, key: &RecordKey) -> Result<Option<Value>>;

    /// Upsert keyed on `key_attribute`.
    async fn put(&self, table: &str, key_attribute: &str, record: Value) -> Result<()>;

    /// Unordered and unbounded. An empty filter list returns the whole table.
    async fn scan(&self, table: &str, filters: &[Filter]) -> Result<Vec<Value>>;

    /// Merges `fields` into the keyed record. Returns false when nothing matched.
    async fn update(&self, table: &str, key: &RecordKey, fields: Map<String, Value>) -> Result<bool>;
}
