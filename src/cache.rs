//! Time-bounded memoization of successful quotes, keyed by
//! (pair, resolved date).

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::clock::Clock;
use crate::normalize::CurrencyPair;
use crate::provider::RateQuote;

struct CacheEntry {
    quote: RateQuote,
    inserted_at: DateTime<Utc>,
}

/// Entries past the TTL read as absent and are evicted on access. The cache
/// is a pure optimization: the engine behaves identically with a zero TTL.
pub struct RateCache {
    inner: RwLock<HashMap<(CurrencyPair, NaiveDate), CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl RateCache {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
            ttl: Duration::from_std(ttl).unwrap_or_else(|_| Duration::hours(1)),
            clock,
        }
    }

    pub fn get(&self, pair: CurrencyPair, date: NaiveDate) -> Option<RateQuote> {
        let now = self.clock.now();
        {
            let cache = self.inner.read().unwrap();
            match cache.get(&(pair, date)) {
                Some(entry) if now - entry.inserted_at < self.ttl => {
                    debug!(%pair, %date, "cache hit");
                    return Some(entry.quote);
                }
                Some(_) => {}
                None => return None,
            }
        }

        // Expired: evict lazily under the write lock, unless a concurrent
        // put refreshed the entry in between.
        let mut cache = self.inner.write().unwrap();
        if let Some(entry) = cache.get(&(pair, date)) {
            if now - entry.inserted_at < self.ttl {
                return Some(entry.quote);
            }
            debug!(%pair, %date, "cache entry expired");
            cache.remove(&(pair, date));
        }
        None
    }

    /// Last write wins; quotes for a given (pair, date) are stable once
    /// published, so no merge is needed.
    pub fn put(&self, quote: RateQuote) {
        let entry = CacheEntry {
            quote,
            inserted_at: self.clock.now(),
        };
        let mut cache = self.inner.write().unwrap();
        debug!(pair = %quote.pair, date = %quote.resolved, "cache put");
        cache.insert((quote.pair, quote.resolved), entry);
    }

    /// Drops everything, returning how many entries were evicted.
    pub fn clear(&self) -> usize {
        let mut cache = self.inner.write().unwrap();
        let count = cache.len();
        cache.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
