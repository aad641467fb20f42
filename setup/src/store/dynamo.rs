use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::error::{BuildError, SdkError};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, KeySchemaElement, KeyType, ProvisionedThroughput, ScalarAttributeType,
    TableStatus as DynamoTableStatus,
};
use common::{Error, Result};
use tracing::debug;

use crate::store::{ConfigStore, CreateOutcome, Item, TableSchema, TableStatus};

pub struct DynamoStore {
    client: DynamoClient,
}

impl DynamoStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: DynamoClient::new(config),
        }
    }
}

fn storage_error<E, R>(e: SdkError<E, R>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match e {
        SdkError::ServiceError(err) => Error::Storage(err.into_err().to_string()),
        _ => Error::Storage(e.to_string()),
    }
}

fn schema_error(e: BuildError) -> Error {
    Error::Storage(format!("Invalid table definition: {}", e))
}

fn string_key(name: &str, key_type: KeyType) -> Result<(AttributeDefinition, KeySchemaElement)> {
    let definition = AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()
        .map_err(schema_error)?;
    let element = KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(key_type)
        .build()
        .map_err(schema_error)?;
    Ok((definition, element))
}

#[async_trait]
impl ConfigStore for DynamoStore {
    async fn table_status(&self, table: &str) -> Result<Option<TableStatus>> {
        let output = match self.client.describe_table().table_name(table).send().await {
            Ok(output) => output,
            Err(SdkError::ServiceError(err)) if err.err().is_resource_not_found_exception() => {
                return Ok(None);
            }
            Err(e) => return Err(storage_error(e)),
        };

        let status = match output.table().and_then(|t| t.table_status()) {
            Some(DynamoTableStatus::Active) => TableStatus::Active,
            Some(DynamoTableStatus::Creating) => TableStatus::Creating,
            Some(DynamoTableStatus::Updating) => TableStatus::Updating,
            Some(DynamoTableStatus::Deleting) => TableStatus::Deleting,
            Some(other) => TableStatus::Other(other.as_str().to_string()),
            None => TableStatus::Other("UNKNOWN".to_string()),
        };
        debug!(table, ?status, "Described table");

        Ok(Some(status))
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<CreateOutcome> {
        let (hash_definition, hash_element) = string_key(&schema.hash_key, KeyType::Hash)?;
        let mut definitions = vec![hash_definition];
        let mut key_schema = vec![hash_element];

        if let Some(range_key) = &schema.range_key {
            let (range_definition, range_element) = string_key(range_key, KeyType::Range)?;
            definitions.push(range_definition);
            key_schema.push(range_element);
        }

        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(schema.read_capacity)
            .write_capacity_units(schema.write_capacity)
            .build()
            .map_err(schema_error)?;

        match self
            .client
            .create_table()
            .table_name(&schema.name)
            .set_attribute_definitions(Some(definitions))
            .set_key_schema(Some(key_schema))
            .provisioned_throughput(throughput)
            .send()
            .await
        {
            Ok(_) => Ok(CreateOutcome::Requested),
            Err(SdkError::ServiceError(err)) if err.err().is_resource_in_use_exception() => {
                Ok(CreateOutcome::AlreadyExists)
            }
            Err(e) => Err(storage_error(e)),
        }
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item))
            .send()
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}
