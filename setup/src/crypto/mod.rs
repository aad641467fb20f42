pub mod kms;

pub use kms::KmsCipher;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use common::Result;

/// Encrypts operator secrets before they are placed in the configuration record.
#[async_trait]
pub trait SecretCipher: Send + Sync {
    async fn encrypt(&self, plaintext: &str) -> Result<Ciphertext>;
}

/// Raw ciphertext bytes as returned by the key service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ciphertext(Vec<u8>);

impl Ciphertext {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Base64 form stored in the record and decoded again by the load functions.
    pub fn to_lambda_string_format(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lambda_string_format() {
        let ciphertext = Ciphertext::new(b"secret".to_vec());
        assert_eq!(ciphertext.to_lambda_string_format(), "c2VjcmV0");
        assert_eq!(ciphertext.as_bytes(), b"secret");
    }

    #[test]
    fn test_lambda_string_format_is_padded() {
        let ciphertext = Ciphertext::new(vec![0xff, 0x00]);
        assert_eq!(ciphertext.to_lambda_string_format(), "/wA=");
    }
}
