use moka::future::Cache;
use std::time::Duration;

/// Refresh-token ids that may no longer be exchanged.
///
/// Entries expire together with the longest-lived token they could
/// refer to, so the cache never outgrows the live refresh tokens.
#[derive(Clone)]
pub struct RevokedTokens {
    cache: Cache<String, ()>,
}

impl RevokedTokens {
    pub fn new(refresh_ttl_secs: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(500_000) // tune based on memory
                .time_to_live(Duration::from_secs(refresh_ttl_secs))
                .build(),
        }
    }

    pub async fn revoke(&self, jti: &str) {
        self.cache.insert(jti.to_string(), ()).await;
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        self.cache.contains_key(jti)
    }

    /// Revokes `jti` unless it already was; false means it had been used.
    pub async fn consume(&self, jti: &str) -> bool {
        let entry = self.cache.entry(jti.to_string()).or_insert(()).await;
        entry.is_fresh()
    }
}
