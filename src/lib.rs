// Travel search aggregator: provider glue, mappers and the JSON API

pub mod auth;
pub mod cache;
pub mod concurrency;
pub mod config;
pub mod currency;
pub mod error;
pub mod filters;
pub mod http_client;
pub mod mappers;
pub mod places_response;
pub mod retry;
pub mod routes;
pub mod services;
pub mod supplier;
pub mod unified;
pub mod validation;

// Re-export key types for convenience
pub use auth::{Authenticator, StaticToken, TokenProvider};
pub use cache::{CacheConfig, CacheStatsReport, TtlCache};
pub use concurrency::map_with_concurrency;
pub use config::AppConfig;
pub use error::{ApiError, RouteError};
pub use filters::{HotelFilter, SortOrder};
pub use http_client::ProviderClient;
pub use retry::RetryConfig;
pub use routes::{app, AppState};
pub use unified::{CurrencyRates, LocationSuggestion, UnifiedFlight, UnifiedHotel, Vehicle};
