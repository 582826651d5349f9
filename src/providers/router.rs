//! Maps a pair to its upstream order and drives retries and failover.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::normalize::{CurrencyCode, CurrencyPair};
use crate::provider::{QuoteSource, RateProvider, RateQuote};
use crate::providers::retry::{RetryPolicy, with_retry};

pub struct ProviderRouter {
    national: Arc<dyn RateProvider>,
    multi: Arc<dyn RateProvider>,
    backup: Arc<dyn RateProvider>,
    retry: RetryPolicy,
}

impl ProviderRouter {
    pub fn new(
        national: Arc<dyn RateProvider>,
        multi: Arc<dyn RateProvider>,
        backup: Arc<dyn RateProvider>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            national,
            multi,
            backup,
            retry,
        }
    }

    /// UAH pairs go to the national bank first, everything else to the
    /// multi-currency source; the backup serves any pair.
    fn route(&self, pair: CurrencyPair) -> [&dyn RateProvider; 2] {
        let primary: &dyn RateProvider = if pair.involves(CurrencyCode::UAH) {
            self.national.as_ref()
        } else {
            self.multi.as_ref()
        };
        [primary, self.backup.as_ref()]
    }
}

#[async_trait]
impl QuoteSource for ProviderRouter {
    async fn quote(&self, pair: CurrencyPair, date: NaiveDate) -> Result<RateQuote, ProviderError> {
        for (position, provider) in self.route(pair).into_iter().enumerate() {
            match with_retry(&self.retry, || provider.lookup(pair, date)).await {
                Ok(rate) => {
                    debug!(%pair, %date, source = %provider.id(), %rate, "quote served");
                    return Ok(RateQuote {
                        pair,
                        requested: date,
                        resolved: date,
                        rate,
                        source: provider.id(),
                    });
                }
                // A clean "nothing published that day" is an answer, not an
                // outage; the date resolver reacts to it, not the backup.
                Err(error) if error.is_no_data() => return Err(error),
                Err(error) if position == 0 => {
                    warn!(%pair, %date, source = %provider.id(), %error, "primary failed, falling over to backup");
                }
                Err(error) => {
                    warn!(%pair, %date, source = %provider.id(), %error, "backup failed too");
                }
            }
        }
        Err(ProviderError::Exhausted { pair, date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_pair;
    use crate::provider::ProviderId;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeProvider {
        id: ProviderId,
        outcome: Result<Decimal, ProviderError>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn serving(id: ProviderId, rate: &str) -> Arc<Self> {
            Arc::new(Self {
                id,
                outcome: Ok(rate.parse().unwrap()),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: ProviderId, error: ProviderError) -> Arc<Self> {
            Arc::new(Self {
                id,
                outcome: Err(error),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RateProvider for FakeProvider {
        fn id(&self) -> ProviderId {
            self.id
        }

        async fn lookup(
            &self,
            _pair: CurrencyPair,
            _date: NaiveDate,
        ) -> Result<Decimal, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            jitter: false,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn router(
        national: Arc<FakeProvider>,
        multi: Arc<FakeProvider>,
        backup: Arc<FakeProvider>,
    ) -> ProviderRouter {
        ProviderRouter::new(national, multi, backup, fast_retry())
    }

    #[tokio::test]
    async fn routes_uah_pairs_to_national_bank() {
        let national = FakeProvider::serving(ProviderId::Nbu, "39.5");
        let multi = FakeProvider::serving(ProviderId::Frankfurter, "1.08");
        let backup = FakeProvider::serving(ProviderId::ExchangeRateHost, "39.6");
        let router = router(national.clone(), multi.clone(), backup.clone());

        let pair = normalize_pair("USD/UAH").unwrap();
        let quote = router.quote(pair, date()).await.unwrap();
        assert_eq!(quote.source, ProviderId::Nbu);
        assert_eq!(national.calls(), 1);
        assert_eq!(multi.calls(), 0);
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn falls_over_to_backup_after_retries() {
        let national = FakeProvider::serving(ProviderId::Nbu, "39.5");
        let multi = FakeProvider::failing(ProviderId::Frankfurter, ProviderError::Status(503));
        let backup = FakeProvider::serving(ProviderId::ExchangeRateHost, "1.09");
        let router = router(national, multi.clone(), backup.clone());

        let pair = normalize_pair("EUR/USD").unwrap();
        let quote = router.quote(pair, date()).await.unwrap();
        assert_eq!(quote.source, ProviderId::ExchangeRateHost);
        assert_eq!(quote.rate, "1.09".parse().unwrap());
        assert_eq!(multi.calls(), 3); // primary retried to exhaustion
        assert_eq!(backup.calls(), 1);
    }

    #[tokio::test]
    async fn no_data_does_not_consult_backup() {
        let pair = normalize_pair("EUR/USD").unwrap();
        let national = FakeProvider::serving(ProviderId::Nbu, "39.5");
        let multi = FakeProvider::failing(
            ProviderId::Frankfurter,
            ProviderError::NoData { pair, date: date() },
        );
        let backup = FakeProvider::serving(ProviderId::ExchangeRateHost, "1.09");
        let router = router(national, multi.clone(), backup.clone());

        let result = router.quote(pair, date()).await;
        assert!(result.unwrap_err().is_no_data());
        assert_eq!(multi.calls(), 1); // no-data is not retried either
        assert_eq!(backup.calls(), 0);
    }

    #[tokio::test]
    async fn both_sources_down_is_exhausted() {
        let national = FakeProvider::serving(ProviderId::Nbu, "39.5");
        let multi = FakeProvider::failing(ProviderId::Frankfurter, ProviderError::Timeout);
        let backup =
            FakeProvider::failing(ProviderId::ExchangeRateHost, ProviderError::Status(502));
        let router = router(national, multi.clone(), backup.clone());

        let pair = normalize_pair("EUR/USD").unwrap();
        let result = router.quote(pair, date()).await;
        assert_eq!(
            result,
            Err(ProviderError::Exhausted { pair, date: date() })
        );
        assert_eq!(multi.calls(), 3);
        assert_eq!(backup.calls(), 3);
    }

    #[tokio::test]
    async fn fatal_primary_error_still_tries_backup() {
        let national = FakeProvider::serving(ProviderId::Nbu, "39.5");
        let multi = FakeProvider::failing(ProviderId::Frankfurter, ProviderError::Status(400));
        let backup = FakeProvider::serving(ProviderId::ExchangeRateHost, "1.09");
        let router = router(national, multi.clone(), backup.clone());

        let pair = normalize_pair("EUR/USD").unwrap();
        let quote = router.quote(pair, date()).await.unwrap();
        assert_eq!(quote.source, ProviderId::ExchangeRateHost);
        assert_eq!(multi.calls(), 1); // 4xx is not retried
        assert_eq!(backup.calls(), 1);
    }
}
