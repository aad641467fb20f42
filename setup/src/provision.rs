use std::time::Duration;

use common::config::{ProvisioningSettings, Settings};
use common::{Error, Result};
use tracing::{debug, info};

use crate::record::ConfigRecord;
use crate::services::RegionalServices;
use crate::store::{ConfigStore, CreateOutcome, TableSchema, TableSet, TableStatus};
use crate::validation::bucket_of;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableReport {
    Existing(String),
    Created(String),
}

/// Creates missing tables and waits for every table to become ACTIVE.
#[derive(Debug, Clone)]
pub struct TableProvisioner {
    poll_interval: Duration,
    max_polls: u32,
}

impl TableProvisioner {
    pub fn new(poll_interval: Duration, max_polls: u32) -> Self {
        Self {
            poll_interval,
            max_polls,
        }
    }

    pub fn from_settings(settings: &ProvisioningSettings) -> Self {
        Self::new(
            Duration::from_millis(settings.poll_interval_ms),
            settings.max_polls,
        )
    }

    pub async fn ensure(
        &self,
        store: &dyn ConfigStore,
        tables: &[&TableSchema],
    ) -> Result<Vec<TableReport>> {
        let mut reports = Vec::with_capacity(tables.len());

        for schema in tables {
            let report = match store.table_status(&schema.name).await? {
                Some(TableStatus::Active) => {
                    debug!(table = %schema.name, "Table already active");
                    TableReport::Existing(schema.name.clone())
                }
                Some(TableStatus::Deleting) => {
                    return Err(Error::Storage(format!(
                        "Table {} is being deleted",
                        schema.name
                    )));
                }
                Some(status) => {
                    info!(table = %schema.name, ?status, "Waiting for existing table");
                    self.wait_until_active(store, &schema.name).await?;
                    TableReport::Existing(schema.name.clone())
                }
                None => {
                    info!(table = %schema.name, "Creating table");
                    let outcome = store.create_table(schema).await?;
                    self.wait_until_active(store, &schema.name).await?;
                    match outcome {
                        CreateOutcome::Requested => TableReport::Created(schema.name.clone()),
                        CreateOutcome::AlreadyExists => TableReport::Existing(schema.name.clone()),
                    }
                }
            };
            reports.push(report);
        }

        Ok(reports)
    }

    async fn wait_until_active(&self, store: &dyn ConfigStore, table: &str) -> Result<()> {
        for poll in 1..=self.max_polls {
            match store.table_status(table).await? {
                Some(TableStatus::Active) => {
                    info!(table, poll, "Table is active");
                    return Ok(());
                }
                Some(TableStatus::Deleting) => {
                    return Err(Error::Storage(format!(
                        "Table {} was deleted while waiting for it",
                        table
                    )));
                }
                status => debug!(table, poll, ?status, "Table not yet active"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(Error::Storage(format!(
            "Table {} did not become ACTIVE after {} polls",
            table, self.max_polls
        )))
    }
}

/// Puts a configuration record, replacing any earlier record with the same key.
#[derive(Debug, Clone)]
pub struct RecordWriter {
    table: String,
}

impl RecordWriter {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub async fn write(
        &self,
        region: &str,
        store: &dyn ConfigStore,
        record: &ConfigRecord,
    ) -> Result<()> {
        let item = record.to_item()?;
        store.put_item(&self.table, item).await?;

        info!(
            table = %self.table,
            s3_prefix = %record.s3_prefix,
            region,
            "Configuration written"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub tables: Vec<TableReport>,
    pub s3_prefix: String,
    pub region: String,
}

/// Provisions the pipeline tables, then writes a configuration record.
pub struct Installer {
    tables: TableSet,
    provisioner: TableProvisioner,
    writer: RecordWriter,
    verify_buckets: bool,
}

impl Installer {
    pub fn new(tables: TableSet, provisioner: TableProvisioner) -> Self {
        let writer = RecordWriter::new(&tables.config.name);
        Self {
            tables,
            provisioner,
            writer,
            verify_buckets: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            TableSet::from_settings(&settings.tables),
            TableProvisioner::from_settings(&settings.provisioning),
        )
        .with_bucket_verification(settings.verify_buckets)
    }

    pub fn with_bucket_verification(mut self, enabled: bool) -> Self {
        self.verify_buckets = enabled;
        self
    }

    /// Writes `record`, which is either the wizard's result or a caller-supplied replacement.
    pub async fn install(
        &self,
        services: &RegionalServices,
        record: &ConfigRecord,
    ) -> Result<InstallReport> {
        record.validate()?;

        if self.verify_buckets {
            for bucket in [bucket_of(&record.s3_prefix), record.manifest_bucket.as_str()] {
                services.buckets.verify_bucket(bucket).await?;
            }
        }

        let tables = self
            .provisioner
            .ensure(services.store.as_ref(), &self.tables.all())
            .await?;

        self.writer
            .write(&services.region, services.store.as_ref(), record)
            .await?;

        Ok(InstallReport {
            tables,
            s3_prefix: record.s3_prefix.clone(),
            region: services.region.clone(),
        })
    }
}
