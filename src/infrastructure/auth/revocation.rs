use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use deadpool_redis::{redis::AsyncCommands, Pool};

use crate::{constants::ACCESS_DENY_PREFIX, errors::AuthError};

/// Deny-list for signed-out access tokens.
#[async_trait]
pub trait TokenRevocationStore: Send + Sync {
    async fn revoke(&self, token: &str, ttl_secs: u64) -> Result<(), AuthError>;
    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError>;
}

fn deny_key(token: &str) -> String {
    format!("{}:{}", ACCESS_DENY_PREFIX, urlencoding::encode(token))
}

/// Process-local deny-list; entries carry their own expiry.
#[derive(Clone, Default)]
pub struct InMemoryRevocations {
    entries: Arc<DashMap<String, i64>>,
}

impl InMemoryRevocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops entries whose tokens have expired anyway.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        before - self.entries.len()
    }
}

#[async_trait]
impl TokenRevocationStore for InMemoryRevocations {
    async fn revoke(&self, token: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let expires_at = Utc::now().timestamp() + ttl_secs as i64;
        self.entries.insert(deny_key(token), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let now = Utc::now().timestamp();
        Ok(self
            .entries
            .get(&deny_key(token))
            .map(|expires_at| *expires_at > now)
            .unwrap_or(false))
    }
}

/// Redis deny-list shared by every instance behind the same Redis.
#[derive(Clone)]
pub struct RedisRevocations {
    pool: Pool,
}

impl RedisRevocations {
    pub fn new(pool: Pool) -> Self {
        RedisRevocations { pool }
    }
}

#[async_trait]
impl TokenRevocationStore for RedisRevocations {
    async fn revoke(&self, token: &str, ttl_secs: u64) -> Result<(), AuthError> {
        let mut conn = self.pool.get().await
            .map_err(|e| AuthError::RevocationStore(e.to_string()))?;

        conn.set_ex::<_, _, ()>(deny_key(token), 1, ttl_secs.max(1))
            .await
            .map_err(|e| AuthError::RevocationStore(e.to_string()))
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, AuthError> {
        let mut conn = self.pool.get().await
            .map_err(|e| AuthError::RevocationStore(e.to_string()))?;

        conn.exists::<_, bool>(deny_key(token))
            .await
            .map_err(|e| AuthError::RevocationStore(e.to_string()))
    }
}
