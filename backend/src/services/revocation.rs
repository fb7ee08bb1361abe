use async_trait::async_trait;
use dashmap::DashSet;

use crate::utils::security::sha256_hex;

/// Set of session tokens that must no longer authenticate.
///
/// Membership is permanent for the life of the store and insertion is
/// idempotent.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, token: &str) -> anyhow::Result<()>;
    async fn is_revoked(&self, token: &str) -> anyhow::Result<bool>;
}

/// Keeps SHA-256 digests of revoked tokens in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    digests: DashSet<String>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, token: &str) -> anyhow::Result<()> {
        let span = tracing::debug_span!("revoke_token");
        let _enter = span.enter();

        if self.digests.insert(sha256_hex(token)) {
            tracing::debug!(revoked = self.digests.len(), "Token added to revocation list");
        }
        Ok(())
    }

    async fn is_revoked(&self, token: &str) -> anyhow::Result<bool> {
        Ok(self.digests.contains(&sha256_hex(token)))
    }
}
