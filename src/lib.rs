//! Currency rate resolution: normalize free-form input, find the nearest
//! prior date with published data, and route lookups across upstream
//! providers with retries, failover and a TTL cache.

pub mod cache;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod log;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod store;

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::RateCache;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::engine::Engine;
use crate::providers::exchangerate_host::ExchangeRateHostProvider;
use crate::providers::frankfurter::FrankfurterProvider;
use crate::providers::nbu::NbuProvider;
use crate::providers::retry::RetryPolicy;
use crate::providers::router::ProviderRouter;
use crate::store::MemoryPairStore;

pub const USER_AGENT: &str = concat!("kursbot/", env!("CARGO_PKG_VERSION"));

/// Wires a ready-to-use engine from configuration.
pub fn build_engine(config: &AppConfig) -> Result<Engine> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.policy.request_timeout())
        .build()?;

    let retry = RetryPolicy {
        max_attempts: config.policy.max_attempts,
        base_delay: config.policy.retry_base_delay(),
        jitter: true,
    };
    let router = ProviderRouter::new(
        Arc::new(NbuProvider::new(config.nbu_url(), client.clone())),
        Arc::new(FrankfurterProvider::new(
            config.frankfurter_url(),
            client.clone(),
        )),
        Arc::new(ExchangeRateHostProvider::new(config.backup_url(), client)),
        retry,
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let cache = RateCache::new(config.policy.cache_ttl(), clock.clone());
    Ok(Engine::new(
        Arc::new(router),
        cache,
        Arc::new(MemoryPairStore::new()),
        clock,
        config.policy.fallback_window_days,
    ))
}

/// Looks up a rate (or converts an amount) and prints the outcome.
pub async fn run_rate(
    pair: &str,
    date: &str,
    amount: Option<&str>,
    config_path: Option<&str>,
) -> Result<()> {
    info!("Resolving rate...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let engine = build_engine(&config)?;
    let resolution = engine.resolve(0, Some(pair), date, amount).await?;

    let quote = resolution.quote;
    match (resolution.amount, resolution.converted) {
        (Some(amount), Some(converted)) => println!(
            "{} {} = {} {} on {} (rate {}, source: {})",
            amount, quote.pair.base, converted, quote.pair.target, quote.resolved, quote.rate, quote.source
        ),
        _ => println!(
            "{} = {} on {} (source: {})",
            quote.pair, quote.rate, quote.resolved, quote.source
        ),
    }
    if quote.resolved != quote.requested {
        println!(
            "note: nothing published for {}, nearest earlier day used",
            quote.requested
        );
    }
    Ok(())
}

/// Prints the supported pair list.
pub fn run_pairs() {
    for (base, target) in normalize::SUPPORTED_PAIRS {
        println!("{base}/{target}");
    }
}
