use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::debug;

use super::ScheduleStore;
use crate::dynamodb::UpdateExpression;
use crate::error::StoreError;
use crate::record::{FilterCriterion, Record};

/// In-process store keyed by record identifier.
///
/// Updates are applied by evaluating the `SET` clause against its placeholder
/// maps, the same way DynamoDB would, so a malformed artifact fails here too.
#[derive(Debug)]
pub struct MemoryStore {
    id_field: String,
    records: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStore {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            records: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    async fn scan(&self, filter: Option<&FilterCriterion>) -> Result<Vec<Record>, StoreError> {
        let records = self.records.read();
        Ok(records
            .values()
            .filter(|record| filter.map_or(true, |f| f.matches(record)))
            .cloned()
            .collect())
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.records.read().get(id).cloned())
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let id = record
            .id(&self.id_field)
            .ok_or_else(|| StoreError::Rejected(format!("missing key '{}'", self.id_field)))?
            .to_string();
        match self.records.write().entry(id) {
            Entry::Occupied(entry) => Err(StoreError::AlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                debug!("Storing record '{}'", entry.key());
                entry.insert(record);
                Ok(())
            }
        }
    }

    async fn update(
        &self,
        id: &str,
        update: UpdateExpression<Value>,
    ) -> Result<Record, StoreError> {
        let assignments = resolve_set_clause(&update)?;
        if assignments
            .iter()
            .any(|(field, _)| field.as_str() == self.id_field)
        {
            return Err(StoreError::Rejected(format!(
                "cannot update key attribute '{}'",
                self.id_field
            )));
        }

        let mut records = self.records.write();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply_fields(assignments);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.records
            .write()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }
}

/// Resolves `SET #a = :a, #b = :b` into `(field, value)` pairs, in clause order.
fn resolve_set_clause(
    update: &UpdateExpression<Value>,
) -> Result<Vec<(String, Value)>, StoreError> {
    let clause = update
        .expression()
        .trim()
        .strip_prefix("SET ")
        .ok_or_else(|| StoreError::Rejected("only SET clauses are supported".to_string()))?;

    let mut assignments = Vec::new();
    for action in clause.split(',') {
        let (name, value) = action
            .split_once('=')
            .ok_or_else(|| StoreError::Rejected(format!("invalid SET action: {action}")))?;
        let (name, value) = (name.trim(), value.trim());

        let field = update
            .names()
            .get(name)
            .ok_or_else(|| StoreError::Rejected(format!("unresolved name placeholder {name}")))?;
        let value = update
            .values()
            .get(value)
            .ok_or_else(|| StoreError::Rejected(format!("unresolved value placeholder {value}")))?;

        if assignments.iter().any(|(seen, _): &(String, Value)| seen == field) {
            return Err(StoreError::Rejected(format!(
                "two document paths overlap: {field}"
            )));
        }
        assignments.push((field.clone(), value.clone()));
    }

    Ok(assignments)
}
