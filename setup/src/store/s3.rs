use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client as S3Client;
use common::{Error, Result};
use tracing::debug;

use crate::store::BucketProbe;

pub struct S3BucketProbe {
    client: S3Client,
}

impl S3BucketProbe {
    pub fn new(config: &SdkConfig) -> Self {
        // Local S3 emulators only resolve path-style bucket addressing.
        let s3_config = aws_sdk_s3::config::Builder::from(config)
            .force_path_style(config.endpoint_url().is_some())
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
        }
    }
}

#[async_trait]
impl BucketProbe for S3BucketProbe {
    /// Verifies that a bucket exists and is accessible
    async fn verify_bucket(&self, bucket: &str) -> Result<()> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => {
                debug!(bucket, "Bucket is accessible");
                Ok(())
            }
            Err(e) => Err(Error::Storage(format!(
                "Cannot access bucket '{}': {}",
                bucket, e
            ))),
        }
    }
}
