use aws_sdk_dynamodb::types::AttributeValue;
use common::{Error, Result};
use serde_json::Value;

use crate::record::ConfigRecord;
use crate::store::Item;

impl ConfigRecord {
    /// Converts the record into the store's attribute map.
    ///
    /// Numbers become `N`, strings `S`, the cluster list an `L` of `M` entries.
    pub fn to_item(&self) -> Result<Item> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields
                .into_iter()
                .map(|(name, value)| (name, to_attribute(value)))
                .collect()),
            other => Err(Error::Other(format!(
                "Configuration record serialized to a non-object value: {}",
                other
            ))),
        }
    }
}

fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s),
        Value::Array(values) => AttributeValue::L(values.into_iter().map(to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .into_iter()
                .map(|(name, value)| (name, to_attribute(value)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::LoadCluster;
    use uuid::Uuid;

    fn record() -> ConfigRecord {
        ConfigRecord {
            current_batch: Uuid::nil(),
            version: "1.0.0".to_string(),
            region: "us-east-1".to_string(),
            s3_prefix: "mybucket/incoming".to_string(),
            filename_filter_regex: None,
            load_clusters: vec![LoadCluster {
                cluster_endpoint: "db.example.com".to_string(),
                cluster_port: 5433,
                connect_user: "admin".to_string(),
                connect_password: "c2VjcmV0".to_string(),
                target_table: "events".to_string(),
                pre_load_statement: Some("TRUNCATE events".to_string()),
                post_load_statement: None,
            }],
            copy_options: None,
            batch_size: Some(50),
            batch_timeout_secs: None,
            manifest_bucket: "mf-bucket".to_string(),
            manifest_key: "manifests/".to_string(),
            failed_manifest_key: "failed/".to_string(),
            success_topic_arn: None,
            failure_topic_arn: Some("arn:aws:sns:us-east-1:1:fail".to_string()),
        }
    }

    #[test]
    fn test_item_attribute_types() {
        let item = record().to_item().unwrap();

        assert_eq!(
            item.get("currentBatch"),
            Some(&AttributeValue::S(Uuid::nil().to_string()))
        );
        assert_eq!(
            item.get("s3Prefix"),
            Some(&AttributeValue::S("mybucket/incoming".to_string()))
        );
        assert_eq!(item.get("batchSize"), Some(&AttributeValue::N("50".to_string())));
        assert_eq!(
            item.get("failureTopicARN"),
            Some(&AttributeValue::S("arn:aws:sns:us-east-1:1:fail".to_string()))
        );
        assert_eq!(
            item.get("manifestKey"),
            Some(&AttributeValue::S("manifests/".to_string()))
        );
    }

    #[test]
    fn test_unset_optionals_are_absent() {
        let item = record().to_item().unwrap();

        for absent in [
            "filenameFilterRegex",
            "copyOptions",
            "batchTimeoutSecs",
            "successTopicARN",
        ] {
            assert!(!item.contains_key(absent), "{} should be absent", absent);
        }
    }

    #[test]
    fn test_cluster_is_list_of_one_map() {
        let item = record().to_item().unwrap();

        let clusters = match item.get("loadClusters") {
            Some(AttributeValue::L(clusters)) => clusters,
            other => panic!("Expected list attribute, got {:?}", other),
        };
        assert_eq!(clusters.len(), 1);

        let cluster = match &clusters[0] {
            AttributeValue::M(fields) => fields,
            other => panic!("Expected map attribute, got {:?}", other),
        };
        assert_eq!(
            cluster.get("clusterPort"),
            Some(&AttributeValue::N("5433".to_string()))
        );
        assert_eq!(
            cluster.get("preLoadStatement"),
            Some(&AttributeValue::S("TRUNCATE events".to_string()))
        );
        assert!(!cluster.contains_key("postLoadStatement"));
    }
}
