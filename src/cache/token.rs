
/// A token as stored by the cache, with its (buffered) expiry instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at_millis: i64, // UNIX TIMESTAMP, millis
}

impl CachedToken {
    pub fn new(token: String, expires_at_millis: i64) -> Self {
        Self { token, expires_at_millis }
    }

    pub fn is_expired_at(&self, now_millis: i64) -> bool {
        now_millis >= self.expires_at_millis
    }
}
