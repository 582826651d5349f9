//! Saved per-user pair preferences. The engine only ever reads these;
//! whatever fronts the engine (bot, CLI) is the writer.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::normalize::CurrencyPair;

#[async_trait]
pub trait PairStore: Send + Sync {
    async fn saved_pair(&self, user: i64) -> Option<CurrencyPair>;

    async fn set_pair(&self, user: i64, pair: CurrencyPair);
}

/// Process-local store; enough for a single instance and for tests.
#[derive(Default)]
pub struct MemoryPairStore {
    inner: RwLock<HashMap<i64, CurrencyPair>>,
}

impl MemoryPairStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PairStore for MemoryPairStore {
    async fn saved_pair(&self, user: i64) -> Option<CurrencyPair> {
        self.inner.read().unwrap().get(&user).copied()
    }

    async fn set_pair(&self, user: i64, pair: CurrencyPair) {
        self.inner.write().unwrap().insert(user, pair);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_pair;

    #[tokio::test]
    async fn set_then_get_per_user() {
        let store = MemoryPairStore::new();
        let pair = normalize_pair("EUR/USD").unwrap();

        assert!(store.saved_pair(1).await.is_none());
        store.set_pair(1, pair).await;
        assert_eq!(store.saved_pair(1).await, Some(pair));
        assert!(store.saved_pair(2).await.is_none());

        let other = normalize_pair("USD/UAH").unwrap();
        store.set_pair(1, other).await;
        assert_eq!(store.saved_pair(1).await, Some(other));
    }
}
