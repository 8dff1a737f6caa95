use std::time::Duration;

use moka::future::Cache;

/// Live refresh tokens by `jti`. A token missing here has been rotated,
/// revoked or has expired.
#[derive(Clone)]
pub struct RefreshTokens {
    cache: Cache<String, u64>,
}

impl RefreshTokens {
    pub fn new(ttl_secs: usize) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(100_000) // tune based on memory
                .time_to_live(Duration::from_secs(ttl_secs as u64))
                .build(),
        }
    }

    /// Remember a freshly issued token for `user_id`.
    pub async fn issue(&self, jti: &str, user_id: u64) {
        self.cache.insert(jti.to_string(), user_id).await;
    }

    /// Removes the token and returns its owner; a token can be used once.
    pub async fn consume(&self, jti: &str) -> Option<u64> {
        self.cache.remove(jti).await
    }

    /// Idempotent revoke.
    pub async fn revoke(&self, jti: &str) {
        self.cache.invalidate(jti).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn token_is_consumed_once() {
        let tokens = RefreshTokens::new(60);
        tokens.issue("abc", 7).await;
        assert_eq!(tokens.consume("abc").await, Some(7));
        assert_eq!(tokens.consume("abc").await, None);
    }

    #[actix_web::test]
    async fn revoked_token_is_gone() {
        let tokens = RefreshTokens::new(60);
        tokens.issue("abc", 7).await;
        tokens.revoke("abc").await;
        tokens.revoke("abc").await;
        assert_eq!(tokens.consume("abc").await, None);
    }
}
