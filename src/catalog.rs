use std::{collections::HashMap, fs, path::Path};

use parking_lot::RwLock;
use serde_json::Value;

use crate::{error::ServiceError, model::AppEnvelope};

/// In-memory set of application model records, keyed by `model_id`.
///
/// Answers lookups in the same envelope format the execute view consumes.
#[derive(Default)]
pub struct AppCatalog {
    records: RwLock<HashMap<String, Value>>,
}

impl AppCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a JSON array. Each record needs a string `model_id`.
    pub fn load_from_path(path: &Path) -> Result<Self, ServiceError> {
        let raw = fs::read_to_string(path)?;
        let records: Vec<Value> = serde_json::from_str(&raw)?;
        let catalog = Self::new();
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    pub fn insert(&self, record: Value) -> Result<(), ServiceError> {
        let model_id = record
            .get("model_id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::BadRequest("catalog record needs a model_id".into()))?
            .to_string();
        self.records.write().insert(model_id, record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn lookup(&self, model_id: &str) -> AppEnvelope {
        match self.records.read().get(model_id) {
            Some(record) => AppEnvelope::ok(record.clone()),
            None => AppEnvelope::with_status(404),
        }
    }
}
