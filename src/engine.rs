//! The orchestrator: normalize input, resolve an available date through the
//! cache, query providers on a miss, and compute the output.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::info;

use crate::cache::RateCache;
use crate::clock::Clock;
use crate::error::{EngineError, ProviderError};
use crate::normalize::{self, CurrencyPair};
use crate::provider::{QuoteSource, RateQuote};
use crate::resolver;
use crate::store::PairStore;

/// Outcome of a resolution: the quote plus, when an amount was given, the
/// converted value rounded half-up to 2 decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub quote: RateQuote,
    pub amount: Option<Decimal>,
    pub converted: Option<Decimal>,
}

pub struct Engine {
    source: Arc<dyn QuoteSource>,
    cache: RateCache,
    store: Arc<dyn PairStore>,
    clock: Arc<dyn Clock>,
    fallback_window_days: u32,
}

impl Engine {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        cache: RateCache,
        store: Arc<dyn PairStore>,
        clock: Arc<dyn Clock>,
        fallback_window_days: u32,
    ) -> Self {
        Self {
            source,
            cache,
            store,
            clock,
            fallback_window_days,
        }
    }

    /// Resolves a raw request for `user`. When `pair_text` is absent the
    /// user's saved pair applies. Lower-layer errors pass through with
    /// their kind intact; the only failure added here is `NoPairSet`.
    pub async fn resolve(
        &self,
        user: i64,
        pair_text: Option<&str>,
        date_text: &str,
        amount_text: Option<&str>,
    ) -> Result<Resolution, EngineError> {
        let requested = normalize::normalize_date(date_text, self.clock.today())?;
        let pair = match pair_text {
            Some(text) => normalize::normalize_pair(text)?,
            None => self
                .store
                .saved_pair(user)
                .await
                .ok_or(EngineError::NoPairSet)?,
        };
        let amount = amount_text.map(normalize::normalize_amount).transpose()?;

        let through = CacheThrough {
            cache: &self.cache,
            inner: self.source.as_ref(),
        };
        let found = resolver::resolve_quote(&through, pair, requested, self.fallback_window_days)
            .await?;
        let quote = RateQuote { requested, ..found };
        info!(
            %pair,
            %requested,
            resolved = %quote.resolved,
            rate = %quote.rate,
            source = %quote.source,
            "resolved"
        );

        let converted = amount
            .map(|amount| (amount * quote.rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero));
        Ok(Resolution {
            quote,
            amount,
            converted,
        })
    }

    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}

/// Checks the cache before each probe and stores every fresh quote, so a
/// repeated request inside the TTL never reaches upstream.
struct CacheThrough<'a> {
    cache: &'a RateCache,
    inner: &'a dyn QuoteSource,
}

#[async_trait]
impl QuoteSource for CacheThrough<'_> {
    async fn quote(&self, pair: CurrencyPair, date: NaiveDate) -> Result<RateQuote, ProviderError> {
        if let Some(quote) = self.cache.get(pair, date) {
            return Ok(quote);
        }
        let quote = self.inner.quote(pair, date).await?;
        self.cache.put(quote);
        Ok(quote)
    }
}
