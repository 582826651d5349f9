//! exchangerate.host, the generic backup for any listed pair.
//! `GET {base}/{YYYY-MM-DD}?base=EUR&symbols=USD` answers
//! `{"rates": {"USD": n}}`.

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

pub struct ExchangeRateHostProvider {
    base_url: String,
    client: reqwest::Client,
}

impl ExchangeRateHostProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoricalResponse {
    #[serde(default)]
    rates: HashMap<String, Decimal>,
}

#[async_trait]
impl RateProvider for ExchangeRateHostProvider {
    fn id(&self) -> ProviderId {
        ProviderId::ExchangeRateHost
    }

    async fn lookup(&self, pair: CurrencyPair, date: NaiveDate) -> Result<Decimal, ProviderError> {
        let url = format!(
            "{}/{}?base={}&symbols={}",
            self.base_url,
            date.format("%Y-%m-%d"),
            pair.base,
            pair.target
        );
        debug!(%url, "requesting backup rate");

        let response = self.client.get(&url).send().await.map_err(classify_reqwest)?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NoData { pair, date }),
            status if !status.is_success() => return Err(ProviderError::Status(status.as_u16())),
            _ => {}
        }

        let body: HistoricalResponse = response.json().await.map_err(classify_reqwest)?;
        body.rates
            .get(pair.target.as_str())
            .copied()
            .ok_or(ProviderError::NoData { pair, date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_pair;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn parses_rate_for_any_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-03-15"))
            .and(query_param("base", "PLN"))
            .and(query_param("symbols", "UAH"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"success":true,"rates":{"UAH":9.87}}"#),
            )
            .mount(&server)
            .await;

        let provider = ExchangeRateHostProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("PLN/UAH").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let rate = provider.lookup(pair, date).await.unwrap();
        assert_eq!(rate, "9.87".parse().unwrap());
    }

    #[tokio::test]
    async fn missing_symbol_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rates":{}}"#))
            .mount(&server)
            .await;

        let provider = ExchangeRateHostProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("EUR/USD").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(provider.lookup(pair, date).await.unwrap_err().is_no_data());
    }
}
