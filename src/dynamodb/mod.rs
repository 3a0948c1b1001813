//! # DynamoDB Module
//!
//! Everything the schedule needs from Amazon DynamoDB.
//!
//! ## Components
//!
//! - `DynamoDb`: the SDK-backed [`crate::store::ScheduleStore`] plus table management.
//! - `UpdateExpression`: turns a field mapping into a `SET` clause and its placeholder maps.
//! - `Schema`: the fields a schedule entry carries.
//! - `Table`: the table name and its key attribute.
//!
//! ## Usage
//!
//! The SDK reads its settings from the standard environment variables:
//!
//! - `AWS_ACCESS_KEY_ID`: Your AWS access key ID.
//! - `AWS_SECRET_ACCESS_KEY`: Your AWS secret access key.
//! - `AWS_REGION`: The AWS region where the table lives.
//!
//! Optionally, you can also set:
//! - `AWS_SESSION_TOKEN`: If you're using temporary credentials.
//! - `AWS_ENDPOINT_URL`: For using a custom endpoint (e.g., DynamoDB Local).
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::json;
//! use tv_schedule_crud::dynamodb::{DynamoDb, Schema, Table, UpdateExpression};
//! use tv_schedule_crud::store::ScheduleStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let sdk_config = aws_config::load_from_env().await;
//!     let table = Table::new("tv-schedule", "id").with_schema(Schema::tv_schedule());
//!     let ddb = DynamoDb::new(&sdk_config, &table);
//!     ddb.create_table_if_not_exists(&table).await?;
//!
//!     let update = UpdateExpression::from_fields([("title", json!("Late News"))])?;
//!     let record = ddb.update("news-2200", update).await?;
//!     println!("{:?}", record);
//!     Ok(())
//! }
//! ```

mod client;
mod schema;
mod table;
mod update;

pub use client::DynamoDb;
pub use schema::{FieldType, Schema};
pub use table::Table;
pub use update::{UpdateExpression, UpdateExpressionError};
