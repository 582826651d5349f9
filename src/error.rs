//! Error taxonomy for the resolution pipeline.
//!
//! Normalization errors mean bad input and are never retried; provider
//! errors distinguish transient transport failures (retried) from a clean
//! "no data published" answer (a control signal for the date fallback).

use chrono::NaiveDate;
use thiserror::Error;

use crate::normalize::CurrencyPair;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("'{0}' is not a currency pair; write it as BASE/TARGET, e.g. EUR/USD")]
    MalformedPair(String),

    #[error("{0} is not a supported pair; see the supported pair list, e.g. EUR/USD")]
    UnsupportedPair(String),

    #[error("could not read '{0}' as a date; use 01.02.2020, 2020-02-01, 'yesterday' or '2 days ago'")]
    UnparseableDate(String),

    #[error("{0} is in the future; rates exist only for past dates")]
    FutureDate(NaiveDate),

    #[error("{0} is too far back; dates are limited to the last 10 years")]
    DateTooOld(NaiveDate),

    #[error("could not read '{0}' as an amount")]
    UnparseableAmount(String),

    #[error("amounts cannot be negative: '{0}'")]
    NegativeAmount(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The upstream answered but has nothing for this pair/date. Not a
    /// failure: the date resolver steps backward on it.
    #[error("no rate published for {pair} on {date}")]
    NoData { pair: CurrencyPair, date: NaiveDate },

    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("upstream answered HTTP {0}")]
    Status(u16),

    #[error("upstream answer was malformed: {0}")]
    Malformed(String),

    /// Primary and backup both failed after retries.
    #[error("rate service temporarily unavailable for {pair}, try again shortly")]
    Exhausted { pair: CurrencyPair, date: NaiveDate },
}

impl ProviderError {
    /// Failures the upstream may recover from by the next attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout | ProviderError::Transport(_) => true,
            ProviderError::Status(code) => *code >= 500,
            _ => false,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self, ProviderError::NoData { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("no pair given and none saved; set one first, e.g. EUR/USD")]
    NoPairSet,

    #[error("no rate for {pair} on {requested} or the {window_days} days before it")]
    NoDataInWindow {
        pair: CurrencyPair,
        requested: NaiveDate,
        window_days: u32,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}
