// Exchange rates per base currency, cached with a stale fallback

use dashmap::DashMap;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::TtlCache;
use crate::config::CurrencyConfig;
use crate::currency::normalize_currency_code;
use crate::error::ApiError;
use crate::http_client::ensure_success;
use crate::unified::CurrencyRates;

#[derive(Debug, Deserialize)]
struct RatesPayload {
    #[serde(default)]
    base_code: Option<String>,
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(default)]
    time_last_update_utc: Option<String>,
}

pub struct CurrencyService {
    http: reqwest::Client,
    url_template: String,
    default_currency: String,
    fresh: TtlCache<String, CurrencyRates>,
    // Last good answer per base, served when a refresh fails
    last_known: DashMap<String, CurrencyRates>,
}

impl CurrencyService {
    pub fn new(http: reqwest::Client, config: &CurrencyConfig) -> Self {
        Self {
            http,
            url_template: config.rates_url_template.clone(),
            default_currency: config.default_currency.clone(),
            fresh: TtlCache::with_ttl(Duration::from_secs(config.ttl_secs)),
            last_known: DashMap::new(),
        }
    }

    pub fn default_currency(&self) -> &str {
        &self.default_currency
    }

    pub async fn rates(&self, base: Option<&str>) -> Result<CurrencyRates, ApiError> {
        let base = normalize_currency_code(base, &self.default_currency);
        if let Some(cached) = self.fresh.get(&base) {
            return Ok(cached);
        }

        match self.fetch(&base).await {
            Ok(rates) => {
                debug!(base = %base, count = rates.rates.len(), "Refreshed currency rates");
                self.fresh.insert(base.clone(), rates.clone(), None);
                self.last_known.insert(base, rates.clone());
                Ok(rates)
            }
            Err(err) => match self.last_known.get(&base) {
                Some(stale) => {
                    warn!(
                        base = %base,
                        error = %err,
                        "Rate refresh failed, serving last known rates"
                    );
                    Ok(stale.clone())
                }
                None => Err(err),
            },
        }
    }

    async fn fetch(&self, base: &str) -> Result<CurrencyRates, ApiError> {
        let url = self.url_template.replace("{base}", base);
        let response = ensure_success(self.http.get(&url).send().await?).await?;
        let payload: RatesPayload = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("currency rates: {}", e)))?;

        let rates = payload
            .rates
            .ok_or_else(|| ApiError::Decode("currency rates: missing rates object".to_string()))?;

        Ok(CurrencyRates {
            base: normalize_currency_code(
                payload.base_code.as_deref().or(payload.base.as_deref()).or(Some(base)),
                base,
            ),
            rates,
            updated_at: Some(
                payload
                    .time_last_update_utc
                    .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_without_cache_is_error() {
        let service = CurrencyService::new(
            reqwest::Client::new(),
            &CurrencyConfig {
                rates_url_template: "http://127.0.0.1:9/latest/{base}".to_string(),
                ..Default::default()
            },
        );

        let result = service.rates(Some("usd")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stale_rates_served_on_failure() {
        let service = CurrencyService::new(
            reqwest::Client::new(),
            &CurrencyConfig {
                rates_url_template: "http://127.0.0.1:9/latest/{base}".to_string(),
                ttl_secs: 0,
                ..Default::default()
            },
        );
        let known = CurrencyRates {
            base: "USD".to_string(),
            rates: HashMap::from([("INR".to_string(), 83.0)]),
            updated_at: None,
        };
        service.last_known.insert("USD".to_string(), known.clone());

        let rates = service.rates(Some("USD")).await.unwrap();
        assert_eq!(rates, known);
    }
}
