use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_sdk_dynamodb::{
    error::ProvideErrorMetadata,
    operation::{
        create_table::CreateTableOutput, describe_table::DescribeTableOutput, scan::ScanOutput,
    },
    types::{
        AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
        ReturnValue, ScalarAttributeType,
    },
    Client,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info};

use crate::dynamodb::{Table, UpdateExpression};
use crate::error::StoreError;
use crate::record::{FilterCriterion, Record};
use crate::store::ScheduleStore;

/// Placeholder for the key attribute in condition expressions. Kept apart from
/// the `#f{n}` placeholders produced by [`UpdateExpression`].
const KEY_PLACEHOLDER: &str = "#pk";
const FILTER_NAME_PLACEHOLDER: &str = "#filter";
const FILTER_VALUE_PLACEHOLDER: &str = ":filter";

/// DynamoDB-backed schedule store.
///
/// Wraps the SDK client together with the table it serves. The client is built
/// once from the process-wide `SdkConfig` and shared by reference afterwards.
///
/// # Record mapping
///
/// Records are converted with `serde_dynamo`: strings become `S`, numbers `N`,
/// booleans `BOOL`, arrays `L` and objects `M`.
///
/// # Missing records
///
/// `update` and `delete` carry an `attribute_exists` condition on the key, so
/// addressing an identifier that is not in the table fails with
/// [`StoreError::NotFound`] instead of silently creating or ignoring it.
/// `put` carries `attribute_not_exists` and fails with
/// [`StoreError::AlreadyExists`] rather than replacing a stored record.
#[derive(Debug)]
pub struct DynamoDb {
    client: Client,
    table_name: String,
    id_field: String,
}

impl DynamoDb {
    /// Creates a new `DynamoDb` instance for `table`.
    pub fn new(sdk_config: &aws_config::SdkConfig, table: &Table<'_>) -> Self {
        Self {
            client: Client::new(sdk_config),
            table_name: table.name().to_string(),
            id_field: table.partition_key().to_string(),
        }
    }

    /// Verifies authentication by attempting to list tables.
    pub async fn check_auth(&self) -> Result<()> {
        self.client.list_tables().send().await.map_err(|e| {
            error!("Authentication failed: {}", e);
            anyhow!("Authentication failed")
        })?;
        info!("Authentication successful");
        Ok(())
    }

    // --- Table Operations ---

    /// Creates the table if it doesn't exist.
    pub async fn create_table_if_not_exists(
        &self,
        table: &Table<'_>,
    ) -> Result<Option<CreateTableOutput>> {
        if self.table_exists(table.name()).await? {
            info!("Table '{}' exists", table.name());
            return Ok(None);
        }

        // identifiers are generated UUIDs, so a string hash key is all the table needs
        let attribute_definitions = vec![AttributeDefinition::builder()
            .attribute_name(table.partition_key())
            .attribute_type(ScalarAttributeType::S)
            .build()?];

        let key_schema = vec![KeySchemaElement::builder()
            .attribute_name(table.partition_key())
            .key_type(KeyType::Hash)
            .build()?];

        let output = self
            .client
            .create_table()
            .table_name(table.name())
            .billing_mode(BillingMode::PayPerRequest)
            .set_attribute_definitions(Some(attribute_definitions))
            .set_key_schema(Some(key_schema))
            .send()
            .await?;
        info!("Table '{}' created", table.name());
        Ok(Some(output))
    }

    /// Deletes a table.
    pub async fn delete_table(&self, table_name: &str) -> Result<()> {
        self.client
            .delete_table()
            .table_name(table_name)
            .send()
            .await?;
        info!("Table '{table_name}' deleted");
        Ok(())
    }

    /// Checks if a table exists, reading every `ListTables` page.
    pub async fn table_exists(&self, table_name: &str) -> Result<bool> {
        let mut names = self.client.list_tables().into_paginator().items().send();
        while let Some(name) = names.next().await {
            if name? == table_name {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Retrieves table description.
    pub async fn describe_table(&self, table_name: &str) -> Result<DescribeTableOutput> {
        self.client
            .describe_table()
            .table_name(table_name)
            .send()
            .await
            .map_err(Into::into)
    }

    // --- Item Operations ---

    fn key(&self, id: &str) -> HashMap<String, AttributeValue> {
        HashMap::from([(self.id_field.clone(), AttributeValue::S(id.to_string()))])
    }

    /// Scans the table, following `LastEvaluatedKey` until every page is read.
    async fn scan_pages(
        &self,
        filter_expression: Option<&str>,
        expression_attribute_names: Option<HashMap<String, String>>,
        expression_attribute_values: Option<HashMap<String, AttributeValue>>,
    ) -> Result<Vec<HashMap<String, AttributeValue>>> {
        let mut items = Vec::new();
        let mut last_evaluated_key = None;

        loop {
            let mut scan = self.client.scan().table_name(&self.table_name);

            if let Some(filter) = filter_expression {
                scan = scan.filter_expression(filter);
            }

            if let Some(names) = &expression_attribute_names {
                scan = scan.set_expression_attribute_names(Some(names.clone()));
            }

            if let Some(values) = &expression_attribute_values {
                scan = scan.set_expression_attribute_values(Some(values.clone()));
            }

            if let Some(key) = last_evaluated_key {
                scan = scan.set_exclusive_start_key(Some(key));
            }

            let response: ScanOutput = scan.send().await?;

            if let Some(new_items) = response.items {
                items.extend(new_items);
            }

            last_evaluated_key = response.last_evaluated_key;

            if last_evaluated_key.is_none() {
                break;
            }
        }

        Ok(items)
    }
}

fn to_record(attributes: HashMap<String, AttributeValue>) -> Result<Record> {
    serde_dynamo::from_item(attributes).context("failed to decode item")
}

/// Sorts an SDK service error into the store's error classes.
///
/// `condition_failed` is what a failed condition expression means for the
/// calling operation: a missing record for update/delete, a taken identifier
/// for put.
fn classify<E>(err: E, condition_failed: StoreError) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err.code() {
        Some("ConditionalCheckFailedException") => condition_failed,
        Some("ValidationException") => {
            StoreError::Rejected(err.message().unwrap_or("validation failed").to_string())
        }
        _ => StoreError::Backend(err.into()),
    }
}

#[async_trait]
impl ScheduleStore for DynamoDb {
    async fn scan(&self, filter: Option<&FilterCriterion>) -> Result<Vec<Record>, StoreError> {
        let items = match filter {
            Some(filter) => {
                self.scan_pages(
                    Some(&format!("{FILTER_NAME_PLACEHOLDER} = {FILTER_VALUE_PLACEHOLDER}")),
                    Some(HashMap::from([(
                        FILTER_NAME_PLACEHOLDER.to_string(),
                        filter.field.clone(),
                    )])),
                    Some(HashMap::from([(
                        FILTER_VALUE_PLACEHOLDER.to_string(),
                        AttributeValue::S(filter.value.clone()),
                    )])),
                )
                .await?
            }
            None => self.scan_pages(None, None, None).await?,
        };

        debug!("Scanned {} item(s) from '{}'", items.len(), self.table_name);
        let records = items
            .into_iter()
            .map(to_record)
            .collect::<Result<Vec<_>>>()?;
        Ok(records)
    }

    async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let response = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key(id)))
            .send()
            .await
            .map_err(|e| classify(e.into_service_error(), StoreError::NotFound(id.to_string())))?;

        Ok(response.item.map(to_record).transpose()?)
    }

    async fn put(&self, record: Record) -> Result<(), StoreError> {
        let id = record.id(&self.id_field).unwrap_or_default().to_string();
        let item: HashMap<String, AttributeValue> =
            serde_dynamo::to_item(&record).context("failed to encode record")?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression(format!("attribute_not_exists({KEY_PLACEHOLDER})"))
            .expression_attribute_names(KEY_PLACEHOLDER, &self.id_field)
            .send()
            .await
            .map_err(|e| classify(e.into_service_error(), StoreError::AlreadyExists(id.clone())))?;

        info!("Item '{id}' added to '{}'", self.table_name);
        Ok(())
    }

    async fn update(
        &self,
        id: &str,
        update: UpdateExpression<Value>,
    ) -> Result<Record, StoreError> {
        let update = update
            .try_map_values(serde_dynamo::to_attribute_value::<_, AttributeValue>)
            .context("failed to encode update values")?;
        let (update_expression, names, values) = update.into_parts();

        let response = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key(id)))
            .update_expression(update_expression)
            .set_expression_attribute_names(Some(names))
            .expression_attribute_names(KEY_PLACEHOLDER, &self.id_field)
            .set_expression_attribute_values(Some(values))
            .condition_expression(format!("attribute_exists({KEY_PLACEHOLDER})"))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| classify(e.into_service_error(), StoreError::NotFound(id.to_string())))?;

        info!("Item '{id}' updated in '{}'", self.table_name);
        let attributes = response
            .attributes
            .ok_or_else(|| anyhow!("update of '{id}' returned no attributes"))?;
        Ok(to_record(attributes)?)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(self.key(id)))
            .condition_expression(format!("attribute_exists({KEY_PLACEHOLDER})"))
            .expression_attribute_names(KEY_PLACEHOLDER, &self.id_field)
            .send()
            .await
            .map_err(|e| classify(e.into_service_error(), StoreError::NotFound(id.to_string())))?;

        info!("Item '{id}' deleted from '{}'", self.table_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_sdk_dynamodb::operation::put_item::PutItemError;
    use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

    fn metadata(code: &str, message: &str) -> ErrorMetadata {
        ErrorMetadata::builder().code(code).message(message).build()
    }

    #[test]
    fn test_classify_failed_condition() {
        let err = UpdateItemError::generic(metadata(
            "ConditionalCheckFailedException",
            "The conditional request failed",
        ));
        assert!(matches!(
            classify(err, StoreError::NotFound("news-1800".into())),
            StoreError::NotFound(id) if id == "news-1800"
        ));

        let err = PutItemError::generic(metadata(
            "ConditionalCheckFailedException",
            "The conditional request failed",
        ));
        assert!(matches!(
            classify(err, StoreError::AlreadyExists("news-1800".into())),
            StoreError::AlreadyExists(id) if id == "news-1800"
        ));
    }

    #[test]
    fn test_classify_validation() {
        let err = UpdateItemError::generic(metadata(
            "ValidationException",
            "Two document paths overlap with each other",
        ));
        assert!(matches!(
            classify(err, StoreError::NotFound("1".into())),
            StoreError::Rejected(msg) if msg == "Two document paths overlap with each other"
        ));
    }

    #[test]
    fn test_classify_backend() {
        for code in ["ProvisionedThroughputExceededException", "InternalServerError"] {
            let err = UpdateItemError::generic(metadata(code, "try again"));
            assert!(matches!(
                classify(err, StoreError::NotFound("1".into())),
                StoreError::Backend(_)
            ));
        }

        let err = UpdateItemError::generic(ErrorMetadata::builder().build());
        assert!(matches!(
            classify(err, StoreError::NotFound("1".into())),
            StoreError::Backend(_)
        ));
    }
}
