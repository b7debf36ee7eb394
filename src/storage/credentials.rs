use std::{fmt, path::Path};

use serde::Deserialize;

use crate::utils::Result;

/// Bucket credentials, read from the `s3` section of a secrets file.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct StorageCredentials {
    pub default_bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    s3: StorageCredentials,
}

impl StorageCredentials {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let secrets: SecretsFile = serde_json::from_str(json)?;
        Ok(secrets.s3)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

// keep the secret out of logs
impl fmt::Debug for StorageCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageCredentials")
            .field("default_bucket", &self.default_bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .finish()
    }
}
