//! Opaque bearer tokens.
//!
//! The token handed to the client is random; the store only keeps its SHA-256
//! hex digest, so a leaked store does not leak usable tokens.

use crate::model::UserId;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

fn fingerprint(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[derive(Default)]
pub struct TokenStore {
    tokens: RwLock<HashMap<String, UserId>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new access token for `user`.
    pub async fn issue(&self, user: UserId) -> String {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        self.tokens.write().await.insert(fingerprint(&token), user);
        token
    }

    pub async fn resolve(&self, token: &str) -> Option<UserId> {
        self.tokens.read().await.get(&fingerprint(token)).copied()
    }

    /// Returns whether the token existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.tokens.write().await.remove(&fingerprint(token)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_resolve_revoke() {
        let store = TokenStore::new();
        let token = store.issue(UserId(9)).await;
        assert_eq!(token.len(), 64);
        assert_eq!(store.resolve(&token).await, Some(UserId(9)));
        assert!(!store.tokens.read().await.contains_key(&token));

        assert!(store.revoke(&token).await);
        assert!(!store.revoke(&token).await);
        assert_eq!(store.resolve(&token).await, None);
    }
}
