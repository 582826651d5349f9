//! Frankfurter, the primary source for the non-UAH pairs.
//! `GET {base}/{YYYY-MM-DD}?from=EUR&to=USD` answers `{"rates": {"USD": n}}`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::normalize::CurrencyPair;
use crate::provider::{ProviderId, RateProvider, classify_reqwest};

pub struct FrankfurterProvider {
    base_url: String,
    client: reqwest::Client,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for FrankfurterProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Frankfurter
    }

    async fn lookup(&self, pair: CurrencyPair, date: NaiveDate) -> Result<Decimal, ProviderError> {
        let url = format!(
            "{}/{}?from={}&to={}",
            self.base_url,
            date.format("%Y-%m-%d"),
            pair.base,
            pair.target
        );
        debug!(%url, "requesting frankfurter rate");

        let response = self.client.get(&url).send().await.map_err(classify_reqwest)?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NoData { pair, date }),
            status if !status.is_success() => return Err(ProviderError::Status(status.as_u16())),
            _ => {}
        }

        let body: FrankfurterResponse = response.json().await.map_err(classify_reqwest)?;
        // A present date with an absent pair is "no data this day", so the
        // date fallback can keep walking.
        body.rates
            .get(pair.target.as_str())
            .copied()
            .ok_or(ProviderError::NoData { pair, date })
    }
}
