use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_kms::Client as KmsClient;
use aws_sdk_kms::error::SdkError;
use aws_sdk_kms::primitives::Blob;
use aws_sdk_kms::types::KeyUsageType;
use common::{Error, Result};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::crypto::{Ciphertext, SecretCipher};
use crate::services::load_sdk_config;

/// Region-bound KMS cipher.
///
/// The key alias is resolved on first use and created when it does not exist yet.
pub struct KmsCipher {
    region: String,
    key_alias: String,
    endpoint_url: Option<String>,
    client: KmsClient,
    key_id: OnceCell<String>,
}

impl KmsCipher {
    pub fn new(config: &SdkConfig, key_alias: &str) -> Self {
        Self {
            region: config
                .region()
                .map(|r| r.to_string())
                .unwrap_or_default(),
            key_alias: key_alias.to_string(),
            endpoint_url: config.endpoint_url().map(|s| s.to_string()),
            client: KmsClient::new(config),
            key_id: OnceCell::new(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn key_alias(&self) -> &str {
        &self.key_alias
    }

    /// Points subsequent encryptions at `region`'s key service.
    ///
    /// The wizard gets a fresh cipher per region from `ServiceProvider::connect`;
    /// this is for callers that hold one cipher across regions.
    pub async fn set_region(&mut self, region: &str) {
        let config = load_sdk_config(region, self.endpoint_url.as_deref()).await;
        info!(region, "Rebinding KMS cipher");
        self.client = KmsClient::new(&config);
        self.region = region.to_string();
        self.key_id = OnceCell::new();
    }

    async fn key_id(&self) -> Result<&str> {
        let key_id = self
            .key_id
            .get_or_try_init(|| self.resolve_or_create_key())
            .await?;
        Ok(key_id.as_str())
    }

    async fn resolve_or_create_key(&self) -> Result<String> {
        match self
            .client
            .describe_key()
            .key_id(&self.key_alias)
            .send()
            .await
        {
            Ok(output) => {
                let key_id = output
                    .key_metadata()
                    .map(|m| m.key_id().to_string())
                    .ok_or_else(|| {
                        Error::Encryption(format!("Key {} has no metadata", self.key_alias))
                    })?;
                debug!(alias = %self.key_alias, %key_id, "Resolved master key");
                Ok(key_id)
            }
            Err(SdkError::ServiceError(err)) if err.err().is_not_found_exception() => {
                self.create_key().await
            }
            Err(e) => Err(encryption_error(e)),
        }
    }

    async fn create_key(&self) -> Result<String> {
        info!(alias = %self.key_alias, region = %self.region, "Creating master key");

        let created = self
            .client
            .create_key()
            .description("Vertica loader master key")
            .key_usage(KeyUsageType::EncryptDecrypt)
            .send()
            .await
            .map_err(encryption_error)?;

        let key_id = created
            .key_metadata()
            .map(|m| m.key_id().to_string())
            .ok_or_else(|| Error::Encryption("Created key has no metadata".to_string()))?;

        self.client
            .create_alias()
            .alias_name(&self.key_alias)
            .target_key_id(&key_id)
            .send()
            .await
            .map_err(encryption_error)?;

        Ok(key_id)
    }
}

fn encryption_error<E, R>(e: SdkError<E, R>) -> Error
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match e {
        SdkError::ServiceError(err) => Error::Encryption(err.into_err().to_string()),
        _ => Error::Encryption(e.to_string()),
    }
}

#[async_trait]
impl SecretCipher for KmsCipher {
    async fn encrypt(&self, plaintext: &str) -> Result<Ciphertext> {
        let key_id = self.key_id().await?;

        let output = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(Blob::new(plaintext.as_bytes()))
            .send()
            .await
            .map_err(encryption_error)?;

        let blob = output
            .ciphertext_blob()
            .ok_or_else(|| Error::Encryption("Key service returned no ciphertext".to_string()))?;

        Ok(Ciphertext::new(blob.as_ref().to_vec()))
    }
}
