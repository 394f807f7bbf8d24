//! Authentication manager

use anyhow::Result;

use super::jwt::{JwtError, SessionClaims, create_session_token, validate_session_token};
use crate::core::SecretStore;

/// Main authentication manager
#[derive(Debug)]
pub struct AuthManager {
    signing_key: Vec<u8>,
    session_ttl_days: u32,
    enabled: bool,
}

impl AuthManager {
    /// Initialize the authentication manager
    pub async fn init(
        secrets: &SecretStore,
        enabled: bool,
        session_ttl_days: u32,
    ) -> Result<Self> {
        let signing_key = secrets.jwt_signing_key().await?;

        if enabled {
            tracing::debug!("Authentication enabled");
        } else {
            tracing::warn!("Authentication DISABLED - all requests act as the local user");
        }

        Ok(Self {
            signing_key,
            session_ttl_days,
            enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn session_ttl_days(&self) -> u32 {
        self.session_ttl_days
    }

    /// Create a session token for an authenticated user
    pub fn create_session(&self, user_id: &str) -> Result<String> {
        create_session_token(&self.signing_key, user_id, self.session_ttl_days)
    }

    /// Validate a JWT session token
    pub fn validate_session(&self, jwt: &str) -> Result<SessionClaims, JwtError> {
        validate_session_token(jwt, &self.signing_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::storage::AppStorage;

    async fn make_manager(enabled: bool) -> AuthManager {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(dir.keep());
        let secrets = SecretStore::new(&storage);
        AuthManager::init(&secrets, enabled, 7).await.unwrap()
    }

    #[tokio::test]
    async fn test_session_roundtrip() {
        let manager = make_manager(true).await;
        let token = manager.create_session("u1").unwrap();
        let claims = manager.validate_session(&token).unwrap();
        assert_eq!(claims.user_id(), "u1");
    }

    #[tokio::test]
    async fn test_enabled_flag() {
        assert!(make_manager(true).await.is_enabled());
        assert!(!make_manager(false).await.is_enabled());
    }
}
