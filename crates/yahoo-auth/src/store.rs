//! In-memory access token slot
//!
//! Holds at most one bearer token for the lifetime of the process. Writes
//! replace the whole value under a write lock, so readers observe either the
//! previous token or the new one and never a partial state. Concurrent
//! exchanges are last-writer-wins.

use common::Secret;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared single-user token store.
///
/// Owned by the relay state and handed to the callback and proxy handlers;
/// tests build their own isolated instance.
#[derive(Default)]
pub struct TokenStore {
    token: RwLock<Option<Secret<String>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the held token with `token`.
    pub async fn set(&self, token: String) {
        let mut slot = self.token.write().await;
        let replaced = slot.is_some();
        *slot = Some(Secret::new(token));
        debug!(replaced, "access token stored");
    }

    /// Current token, if an exchange has ever succeeded.
    pub async fn get(&self) -> Option<Secret<String>> {
        self.token.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}
