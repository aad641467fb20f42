pub mod dynamo;
pub mod s3;

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use common::Result;
use common::config::TableSettings;

/// A record in the store's native attribute representation.
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableStatus {
    Creating,
    Active,
    Updating,
    Deleting,
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Requested,
    AlreadyExists,
}

/// Key layout and throughput of one pipeline table. All key attributes are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub hash_key: String,
    pub range_key: Option<String>,
    pub read_capacity: i64,
    pub write_capacity: i64,
}

impl TableSchema {
    pub fn new(name: &str, hash_key: &str, settings: &TableSettings) -> Self {
        Self {
            name: name.to_string(),
            hash_key: hash_key.to_string(),
            range_key: None,
            read_capacity: settings.read_capacity,
            write_capacity: settings.write_capacity,
        }
    }

    pub fn with_range_key(mut self, range_key: &str) -> Self {
        self.range_key = Some(range_key.to_string());
        self
    }
}

/// The tables the ingestion pipeline needs before its configuration can be stored.
#[derive(Debug, Clone)]
pub struct TableSet {
    pub config: TableSchema,
    pub batches: TableSchema,
    pub files: TableSchema,
}

impl TableSet {
    pub fn from_settings(settings: &TableSettings) -> Self {
        Self {
            config: TableSchema::new(&settings.config_table, "s3Prefix", settings),
            batches: TableSchema::new(&settings.batch_table, "s3Prefix", settings)
                .with_range_key("batchId"),
            files: TableSchema::new(&settings.files_table, "loadFile", settings),
        }
    }

    pub fn all(&self) -> [&TableSchema; 3] {
        [&self.files, &self.batches, &self.config]
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `None` when the table does not exist.
    async fn table_status(&self, table: &str) -> Result<Option<TableStatus>>;

    async fn create_table(&self, schema: &TableSchema) -> Result<CreateOutcome>;

    /// Replaces any item with the same key.
    async fn put_item(&self, table: &str, item: Item) -> Result<()>;
}

#[async_trait]
pub trait BucketProbe: Send + Sync {
    async fn verify_bucket(&self, bucket: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_set_from_settings() {
        let settings = TableSettings::default();
        let tables = TableSet::from_settings(&settings);

        assert_eq!(tables.config.name, "LambdaVerticaBatchLoadConfig");
        assert_eq!(tables.config.hash_key, "s3Prefix");
        assert_eq!(tables.config.range_key, None);
        assert_eq!(tables.batches.range_key.as_deref(), Some("batchId"));
        assert_eq!(tables.files.hash_key, "loadFile");
        assert_eq!(tables.files.read_capacity, 1);
        assert_eq!(tables.files.write_capacity, 5);

        let names: Vec<&str> = tables.all().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "LambdaVerticaProcessedFiles",
                "LambdaVerticaBatches",
                "LambdaVerticaBatchLoadConfig"
            ]
        );
    }
}
