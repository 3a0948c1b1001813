//! # Store
//!
//! The seam between the request adapters and the key-value store holding the
//! schedule. Adapters only ever see a `&dyn ScheduleStore`, created once at
//! process start and shared read-only afterwards.
//!
//! - [`crate::dynamodb::DynamoDb`] talks to Amazon DynamoDB.
//! - [`MemoryStore`] keeps records in process, for tests and offline runs.

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::dynamodb::UpdateExpression;
use crate::error::StoreError;
use crate::record::{FilterCriterion, Record};

#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Returns every record, or only those matching `filter`.
    async fn scan(&self, filter: Option<&FilterCriterion>) -> Result<Vec<Record>, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError>;

    /// Stores a new record.
    ///
    /// Fails with [`StoreError::AlreadyExists`] when a record with the same
    /// identifier is already stored; existing records change only through
    /// [`ScheduleStore::update`].
    async fn put(&self, record: Record) -> Result<(), StoreError>;

    /// Applies a partial update and returns the record as stored afterwards.
    ///
    /// Fails with [`StoreError::NotFound`] when no record has this identifier.
    async fn update(
        &self,
        id: &str,
        update: UpdateExpression<Value>,
    ) -> Result<Record, StoreError>;

    /// Fails with [`StoreError::NotFound`] when no record has this identifier.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}
