//! Backward search for the nearest prior date with published data.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::error::{EngineError, ProviderError};
use crate::normalize::CurrencyPair;
use crate::provider::{QuoteSource, RateQuote};

/// Walks back from `requested` one day at a time until `source` has data,
/// probing at most `window_days` days beyond the requested date. Only an
/// explicit no-data answer steps the walk backward; transport failures
/// propagate unchanged so a provider outage does not read as a week of
/// missing business days.
pub async fn resolve_quote<S>(
    source: &S,
    pair: CurrencyPair,
    requested: NaiveDate,
    window_days: u32,
) -> Result<RateQuote, EngineError>
where
    S: QuoteSource + ?Sized,
{
    for days_back in 0..=window_days {
        let Some(date) = requested.checked_sub_days(Days::new(u64::from(days_back))) else {
            break;
        };
        match source.quote(pair, date).await {
            Ok(quote) => return Ok(quote),
            Err(ProviderError::NoData { .. }) => {
                debug!(%pair, %date, "no data, stepping back a day");
            }
            Err(error) => return Err(EngineError::Provider(error)),
        }
    }
    Err(EngineError::NoDataInWindow {
        pair,
        requested,
        window_days,
    })
}
