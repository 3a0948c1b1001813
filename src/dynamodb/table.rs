use crate::dynamodb::Schema;

/// DynamoDB table configuration for the schedule.
///
/// The table is keyed by a single string partition key, the record identifier.
/// Every other attribute is schemaless as far as DynamoDB is concerned; the
/// optional [`Schema`] only describes the fields the interactive driver prompts for.
///
/// # Capacity
///
/// The table is created in on-demand mode, so there is no throughput to provision.
///
/// # Example
///
/// ```
/// use tv_schedule_crud::dynamodb::{Schema, Table};
///
/// let table = Table::new("tv-schedule", "id").with_schema(Schema::tv_schedule());
/// ```
#[derive(Debug)]
pub struct Table<'a> {
    name: &'a str,
    partition_key: &'a str,
    schema: Option<Schema>,
}

impl<'a> Table<'a> {
    /// Creates a new `Table` instance.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the DynamoDB table.
    /// * `partition_key` - The name of the identifier attribute.
    pub fn new(name: &'a str, partition_key: &'a str) -> Self {
        Self {
            name,
            partition_key,
            schema: None,
        }
    }

    /// Returns the name of the table.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Returns the partition key (identifier field) of the table.
    pub fn partition_key(&self) -> &str {
        self.partition_key
    }

    /// Sets the schema for the table and returns the modified `Table`.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Returns a reference to the table's schema, if set.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }
}
