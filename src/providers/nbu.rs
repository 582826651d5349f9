//! National Bank of Ukraine statistics API, serving every UAH pair.
//! `GET {base}?valcode=USD&date=YYYYMMDD&json` answers `[{"rate": n}]`
//! where `rate` is UAH per unit of the requested currency.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::normalize::{CurrencyCode, CurrencyPair};
use crate::provider::{ProviderId, RateProvider, classify_reqwest};

pub struct NbuProvider {
    base_url: String,
    client: reqwest::Client,
}

impl NbuProvider {
    pub fn new(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Debug, Deserialize)]
struct NbuRecord {
    rate: Decimal,
}

#[async_trait]
impl RateProvider for NbuProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Nbu
    }

    async fn lookup(&self, pair: CurrencyPair, date: NaiveDate) -> Result<Decimal, ProviderError> {
        let other = if pair.base == CurrencyCode::UAH {
            pair.target
        } else {
            pair.base
        };
        let url = format!(
            "{}?valcode={}&date={}&json",
            self.base_url,
            other,
            date.format("%Y%m%d")
        );
        debug!(%url, "requesting nbu rate");

        let response = self.client.get(&url).send().await.map_err(classify_reqwest)?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(ProviderError::NoData { pair, date }),
            status if !status.is_success() => return Err(ProviderError::Status(status.as_u16())),
            _ => {}
        }

        // The NBU answers an empty array for days without a published table.
        let records: Vec<NbuRecord> = response.json().await.map_err(classify_reqwest)?;
        let Some(record) = records.first() else {
            return Err(ProviderError::NoData { pair, date });
        };
        if record.rate <= Decimal::ZERO {
            return Err(ProviderError::Malformed(format!(
                "non-positive NBU rate {}",
                record.rate
            )));
        }

        if pair.base == CurrencyCode::UAH {
            Ok(Decimal::ONE / record.rate)
        } else {
            Ok(record.rate)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_pair;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[tokio::test]
    async fn uah_target_uses_published_rate_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("valcode", "USD"))
            .and(query_param("date", "20240315"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"[{"r030":840,"txt":"Долар США","rate":39.5,"cc":"USD"}]"#),
            )
            .mount(&server)
            .await;

        let provider = NbuProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("USD/UAH").unwrap();
        let rate = provider.lookup(pair, date()).await.unwrap();
        assert_eq!(rate, "39.5".parse().unwrap());
    }

    #[tokio::test]
    async fn uah_base_inverts_published_rate() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("valcode", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"rate":40}]"#))
            .mount(&server)
            .await;

        let provider = NbuProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("UAH/USD").unwrap();
        let rate = provider.lookup(pair, date()).await.unwrap();
        assert_eq!(rate, "0.025".parse().unwrap());
    }

    #[tokio::test]
    async fn empty_table_is_no_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .mount(&server)
            .await;

        let provider = NbuProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("UAH/EUR").unwrap();
        assert!(provider.lookup(pair, date()).await.unwrap_err().is_no_data());
    }

    #[tokio::test]
    async fn non_positive_rate_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"[{"rate":0}]"#))
            .mount(&server)
            .await;

        let provider = NbuProvider::new(&server.uri(), reqwest::Client::new());
        let pair = normalize_pair("UAH/USD").unwrap();
        assert!(matches!(
            provider.lookup(pair, date()).await,
            Err(ProviderError::Malformed(_))
        ));
    }
}
