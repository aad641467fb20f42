use std::sync::Arc;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::config::Region;
use common::Result;
use common::config::Settings;
use tracing::info;

use crate::crypto::{KmsCipher, SecretCipher};
use crate::store::dynamo::DynamoStore;
use crate::store::s3::S3BucketProbe;
use crate::store::{BucketProbe, ConfigStore};

/// Clients bound to the region chosen by the operator.
#[derive(Clone)]
pub struct RegionalServices {
    pub region: String,
    pub store: Arc<dyn ConfigStore>,
    pub cipher: Arc<dyn SecretCipher>,
    pub buckets: Arc<dyn BucketProbe>,
}

/// Builds the region-scoped clients once the region answer is known.
#[async_trait]
pub trait ServiceProvider: Send + Sync {
    async fn connect(&self, region: &str) -> Result<RegionalServices>;
}

/// AWS-backed provider: DynamoDB for storage, KMS for secrets, S3 for bucket probes.
pub struct AwsServices {
    key_alias: String,
    endpoint_url: Option<String>,
}

impl AwsServices {
    pub fn new(settings: &Settings) -> Self {
        Self {
            key_alias: settings.kms_key_alias.clone(),
            endpoint_url: settings.endpoint_url.clone(),
        }
    }
}

#[async_trait]
impl ServiceProvider for AwsServices {
    async fn connect(&self, region: &str) -> Result<RegionalServices> {
        let config = load_sdk_config(region, self.endpoint_url.as_deref()).await;
        info!(region, endpoint = ?self.endpoint_url, "Configured regional clients");

        Ok(RegionalServices {
            region: region.to_string(),
            store: Arc::new(DynamoStore::new(&config)),
            cipher: Arc::new(KmsCipher::new(&config, &self.key_alias)),
            buckets: Arc::new(S3BucketProbe::new(&config)),
        })
    }
}

/// Shared SDK configuration for `region`, optionally pointed at a local endpoint.
pub async fn load_sdk_config(region: &str, endpoint_url: Option<&str>) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));

    if let Some(endpoint) = endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
