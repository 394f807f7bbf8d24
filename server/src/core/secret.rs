//! JWT signing key persistence
//!
//! The signing key is a 32-byte random value stored hex-encoded in the data
//! directory, created on first start. File permissions are restricted to
//! the owning user on Unix.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::constants::SIGNING_KEY_FILENAME;
use super::storage::AppStorage;
use crate::utils::crypto::generate_signing_key;

/// Manages the server's signing key
#[derive(Debug)]
pub struct SecretStore {
    key_path: PathBuf,
}

impl SecretStore {
    pub fn new(storage: &AppStorage) -> Self {
        Self {
            key_path: storage.data_path(SIGNING_KEY_FILENAME),
        }
    }

    /// Load the signing key, generating and persisting one on first use
    pub async fn jwt_signing_key(&self) -> Result<Vec<u8>> {
        if self.key_path.exists() {
            let text = tokio::fs::read_to_string(&self.key_path)
                .await
                .with_context(|| {
                    format!("Failed to read signing key: {}", self.key_path.display())
                })?;
            let key = hex::decode(text.trim())
                .with_context(|| "Signing key file is not valid hex".to_string())?;
            anyhow::ensure!(key.len() == 32, "Signing key must be 32 bytes");
            return Ok(key);
        }

        let key = generate_signing_key();
        tokio::fs::write(&self.key_path, hex::encode(&key))
            .await
            .with_context(|| {
                format!("Failed to write signing key: {}", self.key_path.display())
            })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = tokio::fs::set_permissions(&self.key_path, perms).await {
                tracing::warn!(error = %e, "Failed to restrict signing key permissions");
            }
        }

        tracing::debug!(path = %self.key_path.display(), "Generated new signing key");
        Ok(key)
    }
}
