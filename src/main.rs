mod command_line;

use anyhow::{anyhow, Result};
use aws_sdk_dynamodb::types::TableStatus;
use tracing::info;

use tv_schedule_crud::api::Api;
use tv_schedule_crud::config::{Config, StoreBackend};
use tv_schedule_crud::dynamodb::{DynamoDb, Schema, Table};
use tv_schedule_crud::logging;
use tv_schedule_crud::store::{MemoryStore, ScheduleStore};
use tv_schedule_crud::utils::{retry_with_backoff, Backoff};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    logging::init_logging(config.log_level)?;

    let table =
        Table::new(&config.table_name, &config.id_field).with_schema(Schema::tv_schedule());

    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store");
            let store = MemoryStore::new(&config.id_field);
            serve(&store, &config, &table).await
        }
        StoreBackend::DynamoDb => {
            let sdk_config = aws_config::load_from_env().await;
            let ddb = DynamoDb::new(&sdk_config, &table);
            ddb.check_auth().await?;
            provision_table(&ddb, &table).await?;
            serve(&ddb, &config, &table).await
        }
    }
}

/// Creates the table when missing and waits until DynamoDB reports it active.
async fn provision_table(ddb: &DynamoDb, table: &Table<'_>) -> Result<()> {
    retry_with_backoff(
        "Create table",
        || ddb.create_table_if_not_exists(table),
        Backoff::default(),
    )
    .await?;

    retry_with_backoff(
        "Wait for table",
        || async move {
            let output = ddb.describe_table(table.name()).await?;
            match output.table().and_then(|t| t.table_status()) {
                Some(TableStatus::Active) => Ok(()),
                status => Err(anyhow!("table status is {:?}", status)),
            }
        },
        Backoff::default(),
    )
    .await?;

    info!("Table '{}' is active", table.name());
    Ok(())
}

async fn serve(store: &dyn ScheduleStore, config: &Config, table: &Table<'_>) -> Result<()> {
    let schema = table
        .schema()
        .ok_or_else(|| anyhow!("Table schema not defined"))?;
    let api = Api::new(store, config);
    command_line::run(&api, table.name(), schema).await
}
