//! Revocation registry: tokens invalidated before their natural expiry.

use dashmap::DashMap;

/// Process-wide set of revoked token strings.
///
/// Each entry keeps the token's expiry timestamp so the sweep can drop
/// it once the token would have died on its own anyway. Membership
/// checks and inserts may interleave freely across request tasks.
#[derive(Debug, Default)]
pub struct RevocationRegistry {
    revoked: DashMap<String, i64>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a token as revoked. Idempotent: revoking twice is a no-op.
    pub fn revoke(&self, token: &str, expires_at: i64) {
        self.revoked
            .entry(token.to_string())
            .and_modify(|exp| *exp = (*exp).max(expires_at))
            .or_insert(expires_at);
    }

    /// Whether a token has been revoked.
    pub fn is_revoked(&self, token: &str) -> bool {
        self.revoked.contains_key(token)
    }

    /// Drop entries whose tokens have expired on their own by `now`.
    ///
    /// An expired token is rejected by the codec regardless of the
    /// registry, so keeping its entry only wastes memory. Returns the
    /// number of entries removed.
    pub fn sweep_expired(&self, now: i64) -> usize {
        let before = self.revoked.len();
        self.revoked.retain(|_, exp| *exp > now);
        before - self.revoked.len()
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
