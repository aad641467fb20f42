pub mod item;

use common::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::DEFAULT_CLUSTER_PORT;

/// The configuration item read by the load functions.
///
/// Optional attributes are omitted from the stored item when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub current_batch: Uuid,
    pub version: String,
    pub region: String,
    pub s3_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_filter_regex: Option<String>,
    pub load_clusters: Vec<LoadCluster>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copy_options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_timeout_secs: Option<i64>,
    pub manifest_bucket: String,
    pub manifest_key: String,
    pub failed_manifest_key: String,
    #[serde(
        rename = "successTopicARN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub success_topic_arn: Option<String>,
    #[serde(
        rename = "failureTopicARN",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failure_topic_arn: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadCluster {
    pub cluster_endpoint: String,
    #[serde(default = "default_cluster_port")]
    pub cluster_port: i64,
    pub connect_user: String,
    /// Base64 ciphertext, never the plaintext password.
    pub connect_password: String,
    pub target_table: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_load_statement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_load_statement: Option<String>,
}

fn default_cluster_port() -> i64 {
    DEFAULT_CLUSTER_PORT
}

fn required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Blank {
            message: format!("{} is required", field),
        });
    }
    Ok(())
}

fn omitted_or_present(field: &str, value: &Option<String>) -> Result<(), ValidationError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ValidationError::Blank {
            message: format!("{} must be omitted rather than blank", field),
        }),
        _ => Ok(()),
    }
}

impl ConfigRecord {
    /// Checks the presence rules a record must satisfy before it may be written.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("region", &self.region)?;
        required("s3Prefix", &self.s3_prefix)?;
        omitted_or_present("filenameFilterRegex", &self.filename_filter_regex)?;
        omitted_or_present("copyOptions", &self.copy_options)?;
        omitted_or_present("successTopicARN", &self.success_topic_arn)?;
        omitted_or_present("failureTopicARN", &self.failure_topic_arn)?;
        required("manifestBucket", &self.manifest_bucket)?;
        required("manifestKey", &self.manifest_key)?;
        required("failedManifestKey", &self.failed_manifest_key)?;

        if self.load_clusters.is_empty() {
            return Err(ValidationError::Blank {
                message: "At least one load cluster is required".to_string(),
            });
        }
        for cluster in &self.load_clusters {
            cluster.validate()?;
        }

        Ok(())
    }
}

impl LoadCluster {
    fn validate(&self) -> Result<(), ValidationError> {
        required("clusterEndpoint", &self.cluster_endpoint)?;
        required("connectUser", &self.connect_user)?;
        required("connectPassword", &self.connect_password)?;
        required("targetTable", &self.target_table)?;
        omitted_or_present("preLoadStatement", &self.pre_load_statement)?;
        omitted_or_present("postLoadStatement", &self.post_load_statement)?;
        if self.cluster_port <= 0 {
            return Err(ValidationError::NotPositive {
                value: self.cluster_port.to_string(),
            });
        }
        Ok(())
    }
}

/// Accumulates answers as the wizard progresses.
#[derive(Debug, Clone)]
pub struct ConfigRecordBuilder {
    current_batch: Uuid,
    version: String,
    region: Option<String>,
    s3_prefix: Option<String>,
    filename_filter_regex: Option<String>,
    copy_options: Option<String>,
    batch_size: Option<i64>,
    batch_timeout_secs: Option<i64>,
    manifest_bucket: Option<String>,
    manifest_key: Option<String>,
    failed_manifest_key: Option<String>,
    success_topic_arn: Option<String>,
    failure_topic_arn: Option<String>,
    cluster: ClusterDraft,
}

#[derive(Debug, Clone, Default)]
struct ClusterDraft {
    endpoint: Option<String>,
    port: Option<i64>,
    user: Option<String>,
    password: Option<String>,
    target_table: Option<String>,
    pre_load_statement: Option<String>,
    post_load_statement: Option<String>,
}

impl Default for ConfigRecordBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigRecordBuilder {
    /// Starts a record with a fresh batch identifier and this tool's version.
    pub fn new() -> Self {
        Self::with_identity(Uuid::new_v4(), env!("CARGO_PKG_VERSION"))
    }

    pub fn with_identity(current_batch: Uuid, version: &str) -> Self {
        Self {
            current_batch,
            version: version.to_string(),
            region: None,
            s3_prefix: None,
            filename_filter_regex: None,
            copy_options: None,
            batch_size: None,
            batch_timeout_secs: None,
            manifest_bucket: None,
            manifest_key: None,
            failed_manifest_key: None,
            success_topic_arn: None,
            failure_topic_arn: None,
            cluster: ClusterDraft::default(),
        }
    }

    pub fn current_batch(&self) -> Uuid {
        self.current_batch
    }

    pub fn region(&mut self, region: String) -> &mut Self {
        self.region = Some(region);
        self
    }

    pub fn s3_prefix(&mut self, prefix: String) -> &mut Self {
        self.s3_prefix = Some(prefix);
        self
    }

    pub fn filename_filter_regex(&mut self, pattern: String) -> &mut Self {
        self.filename_filter_regex = Some(pattern);
        self
    }

    pub fn copy_options(&mut self, options: String) -> &mut Self {
        self.copy_options = Some(options);
        self
    }

    pub fn batch_size(&mut self, size: i64) -> &mut Self {
        self.batch_size = Some(size);
        self
    }

    pub fn batch_timeout_secs(&mut self, secs: i64) -> &mut Self {
        self.batch_timeout_secs = Some(secs);
        self
    }

    pub fn manifest_bucket(&mut self, bucket: String) -> &mut Self {
        self.manifest_bucket = Some(bucket);
        self
    }

    pub fn manifest_key(&mut self, key: String) -> &mut Self {
        self.manifest_key = Some(key);
        self
    }

    pub fn failed_manifest_key(&mut self, key: String) -> &mut Self {
        self.failed_manifest_key = Some(key);
        self
    }

    pub fn success_topic_arn(&mut self, arn: String) -> &mut Self {
        self.success_topic_arn = Some(arn);
        self
    }

    pub fn failure_topic_arn(&mut self, arn: String) -> &mut Self {
        self.failure_topic_arn = Some(arn);
        self
    }

    pub fn cluster_endpoint(&mut self, endpoint: String) -> &mut Self {
        self.cluster.endpoint = Some(endpoint);
        self
    }

    pub fn cluster_port(&mut self, port: i64) -> &mut Self {
        self.cluster.port = Some(port);
        self
    }

    pub fn connect_user(&mut self, user: String) -> &mut Self {
        self.cluster.user = Some(user);
        self
    }

    /// Expects the already-encrypted, string-formatted password.
    pub fn connect_password(&mut self, ciphertext: String) -> &mut Self {
        self.cluster.password = Some(ciphertext);
        self
    }

    pub fn target_table(&mut self, table: String) -> &mut Self {
        self.cluster.target_table = Some(table);
        self
    }

    pub fn pre_load_statement(&mut self, statement: String) -> &mut Self {
        self.cluster.pre_load_statement = Some(statement);
        self
    }

    pub fn post_load_statement(&mut self, statement: String) -> &mut Self {
        self.cluster.post_load_statement = Some(statement);
        self
    }

    pub fn build(self) -> Result<ConfigRecord, ValidationError> {
        let cluster = LoadCluster {
            cluster_endpoint: self.cluster.endpoint.unwrap_or_default(),
            cluster_port: self.cluster.port.unwrap_or(DEFAULT_CLUSTER_PORT),
            connect_user: self.cluster.user.unwrap_or_default(),
            connect_password: self.cluster.password.unwrap_or_default(),
            target_table: self.cluster.target_table.unwrap_or_default(),
            pre_load_statement: self.cluster.pre_load_statement,
            post_load_statement: self.cluster.post_load_statement,
        };

        let record = ConfigRecord {
            current_batch: self.current_batch,
            version: self.version,
            region: self.region.unwrap_or_default(),
            s3_prefix: self.s3_prefix.unwrap_or_default(),
            filename_filter_regex: self.filename_filter_regex,
            load_clusters: vec![cluster],
            copy_options: self.copy_options,
            batch_size: self.batch_size,
            batch_timeout_secs: self.batch_timeout_secs,
            manifest_bucket: self.manifest_bucket.unwrap_or_default(),
            manifest_key: self.manifest_key.unwrap_or_default(),
            failed_manifest_key: self.failed_manifest_key.unwrap_or_default(),
            success_topic_arn: self.success_topic_arn,
            failure_topic_arn: self.failure_topic_arn,
        };

        record.validate()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn complete_builder() -> ConfigRecordBuilder {
        let mut builder = ConfigRecordBuilder::with_identity(Uuid::nil(), "2.0.0");
        builder
            .region("eu-west-1".to_string())
            .s3_prefix("bucket/in".to_string())
            .cluster_endpoint("db.internal".to_string())
            .target_table("events".to_string())
            .connect_user("loader".to_string())
            .connect_password("Y2lwaGVy".to_string())
            .manifest_bucket("manifests".to_string())
            .manifest_key("m/".to_string())
            .failed_manifest_key("failed/".to_string());
        builder
    }

    #[test]
    fn test_build_defaults_port() {
        let record = complete_builder().build().unwrap();

        assert_eq!(record.load_clusters.len(), 1);
        assert_eq!(record.load_clusters[0].cluster_port, 5433);
        assert_eq!(record.version, "2.0.0");
        assert_eq!(record.current_batch, Uuid::nil());
        assert_eq!(record.batch_size, None);
    }

    #[test]
    fn test_build_requires_fields() {
        let mut builder = ConfigRecordBuilder::new();
        builder.region("us-east-1".to_string());

        let err = builder.build().unwrap_err();
        assert_eq!(
            err,
            ValidationError::Blank {
                message: "s3Prefix is required".to_string()
            }
        );
    }

    #[test]
    fn test_new_builders_get_distinct_batches() {
        let first = ConfigRecordBuilder::new();
        let second = ConfigRecordBuilder::new();
        assert_ne!(first.current_batch(), second.current_batch());
    }

    #[test]
    fn test_validate_rejects_blank_optional() {
        let mut record = complete_builder().build().unwrap();
        record.copy_options = Some("  ".to_string());

        assert!(matches!(
            record.validate(),
            Err(ValidationError::Blank { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_missing_clusters() {
        let mut record = complete_builder().build().unwrap();
        record.load_clusters.clear();

        assert!(record.validate().is_err());
    }

    #[test]
    fn test_deserialize_override_record() {
        let json = r#"{
            "currentBatch": "00000000-0000-0000-0000-000000000000",
            "version": "1.0.0",
            "region": "us-west-2",
            "s3Prefix": "raw/events",
            "loadClusters": [{
                "clusterEndpoint": "vertica.local",
                "connectUser": "dbadmin",
                "connectPassword": "c2VjcmV0",
                "targetTable": "public.events"
            }],
            "batchSize": 100,
            "manifestBucket": "manifests",
            "manifestKey": "m/",
            "failedManifestKey": "f/",
            "failureTopicARN": "arn:aws:sns:us-west-2:123456789012:failures"
        }"#;

        let record: ConfigRecord = serde_json::from_str(json).unwrap();
        record.validate().unwrap();

        assert_eq!(record.load_clusters[0].cluster_port, 5433);
        assert_eq!(record.batch_size, Some(100));
        assert_eq!(
            record.failure_topic_arn.as_deref(),
            Some("arn:aws:sns:us-west-2:123456789012:failures")
        );
        assert_eq!(record.success_topic_arn, None);
    }
}
