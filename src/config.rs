// Application configuration
// Defaults are built in; an optional config/default and config/local file and
// TRAVEL_* environment variables (e.g. TRAVEL_PROVIDER__CLIENT_ID) override them.

use serde::Deserialize;
use std::time::Duration;

use crate::retry::RetryConfig;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub places: PlacesConfig,
    pub currency: CurrencyConfig,
    pub retry: RetryConfig,
    pub flights: FlightConfig,
    pub hotels: HotelConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

// GDS-style flight/hotel/transfer provider
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub timeout_ms: u64,
    pub token_refresh_margin_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://test.api.amadeus.com".to_string(),
            client_id: None,
            client_secret: None,
            timeout_ms: 15_000,
            token_refresh_margin_secs: 60,
        }
    }
}

impl ProviderConfig {
    // The base URL is sometimes configured with a version suffix; paths
    // always carry their own version so strip it.
    pub fn api_base(&self) -> String {
        let trimmed = self.base_url.trim_end_matches('/');
        trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_string()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlacesConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub lookup_ttl_secs: u64,
    pub enrichment_limit: usize,
    pub enrichment_concurrency: usize,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api/place".to_string(),
            api_key: None,
            lookup_ttl_secs: 24 * 60 * 60,
            enrichment_limit: 20,
            enrichment_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurrencyConfig {
    pub rates_url_template: String,
    pub ttl_secs: u64,
    pub default_currency: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            rates_url_template: "https://open.er-api.com/v6/latest/{base}".to_string(),
            ttl_secs: 60 * 60,
            default_currency: "INR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    // Query the real-time availability endpoint before the priced offers one
    pub availability_first: bool,
    pub default_max: u32,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            availability_first: true,
            default_max: 25,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HotelConfig {
    pub max_hotel_ids: usize,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self { max_hotel_ids: 50 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("TRAVEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("https://test.api.amadeus.com/v1", "https://test.api.amadeus.com"; "version suffix")]
    #[test_case("https://test.api.amadeus.com/v1/", "https://test.api.amadeus.com"; "version suffix with slash")]
    #[test_case("http://127.0.0.1:9000", "http://127.0.0.1:9000"; "bare host")]
    fn test_api_base_strips_version(base_url: &str, expected: &str) {
        let config = ProviderConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_base(), expected);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.provider.token_refresh_margin_secs, 60);
        assert_eq!(config.places.enrichment_limit, 20);
        assert_eq!(config.places.enrichment_concurrency, 4);
        assert_eq!(config.hotels.max_hotel_ids, 50);
        assert_eq!(config.currency.default_currency, "INR");
        assert!(config.flights.availability_first);
    }
}
