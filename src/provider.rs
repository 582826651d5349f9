//! Upstream rate source abstractions.

use std::fmt;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ProviderError;
use crate::normalize::CurrencyPair;

/// Identifies which upstream served a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Frankfurter,
    Nbu,
    ExchangeRateHost,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProviderId::Frankfurter => "frankfurter",
            ProviderId::Nbu => "nbu",
            ProviderId::ExchangeRateHost => "exchangerate.host",
        })
    }
}

/// A rate resolved for a request. `resolved` may precede `requested` by at
/// most the fallback window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateQuote {
    pub pair: CurrencyPair,
    pub requested: NaiveDate,
    pub resolved: NaiveDate,
    pub rate: Decimal,
    pub source: ProviderId,
}

/// One concrete upstream. `lookup` is a single attempt with no retries;
/// retry and failover policy live in the router.
#[async_trait]
pub trait RateProvider: Send + Sync {
    fn id(&self) -> ProviderId;

    async fn lookup(&self, pair: CurrencyPair, date: NaiveDate) -> Result<Decimal, ProviderError>;
}

/// Anything that can produce a full quote for a pair on a date: the router,
/// the engine's cache-through wrapper, test doubles.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn quote(&self, pair: CurrencyPair, date: NaiveDate) -> Result<RateQuote, ProviderError>;
}

pub(crate) fn classify_reqwest(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else if err.is_decode() {
        ProviderError::Malformed(err.to_string())
    } else {
        ProviderError::Transport(err.to_string())
    }
}
