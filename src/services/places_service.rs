// Places API lookups used to enrich hotels, plus the photo fetch

use bytes::Bytes;
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::{CacheConfig, TtlCache};
use crate::config::PlacesConfig;
use crate::error::ApiError;
use crate::http_client::ensure_success;
use crate::mappers::map_place_details_to_hotel;
use crate::places_response::{FindPlaceResponse, PlaceDetails, PlaceDetailsResponse};
use crate::unified::PlaceEnrichment;

pub const DETAIL_FIELDS: [&str; 10] = [
    "name",
    "rating",
    "user_ratings_total",
    "photos",
    "reviews",
    "formatted_address",
    "geometry",
    "url",
    "website",
    "formatted_phone_number",
];

const LOCATION_BIAS_RADIUS_M: u32 = 2_000;
const DEFAULT_PHOTO_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone)]
pub struct PlacePhoto {
    pub content_type: String,
    pub bytes: Bytes,
}

// Secondary data source for hotels. Lookups never fail the caller: any
// problem is logged and reported as "no data".
pub struct PlacesService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    place_ids: TtlCache<String, Option<String>>,
    details: TtlCache<String, PlaceDetails>,
}

impl PlacesService {
    pub fn new(http: reqwest::Client, config: &PlacesConfig) -> Self {
        let cache_config = CacheConfig {
            default_ttl: Duration::from_secs(config.lookup_ttl_secs),
            ..Default::default()
        };
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            place_ids: TtlCache::new(cache_config.clone()),
            details: TtlCache::new(cache_config),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.api_key.as_deref().ok_or_else(|| {
            ApiError::MissingCredentials("places api_key is not configured".to_string())
        })
    }

    fn url(&self, endpoint: &str, params: &[(&str, String)]) -> Result<reqwest::Url, ApiError> {
        reqwest::Url::parse_with_params(&format!("{}/{}", self.base_url, endpoint), params)
            .map_err(|e| ApiError::Config(format!("invalid places url: {}", e)))
    }

    pub async fn find_place_id(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Option<String> {
        let key = match (latitude, longitude) {
            (Some(lat), Some(lng)) => format!("{}|{:.4},{:.4}", name.to_lowercase(), lat, lng),
            _ => name.to_lowercase(),
        };
        if let Some(cached) = self.place_ids.get(&key) {
            return cached;
        }

        match self.lookup_place_id(name, latitude, longitude).await {
            Ok(place_id) => {
                self.place_ids.insert(key, place_id.clone(), None);
                place_id
            }
            Err(err) => {
                warn!(hotel = name, error = %err, "Place lookup failed");
                None
            }
        }
    }

    async fn lookup_place_id(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Option<String>, ApiError> {
        let mut params = vec![
            ("input", name.to_string()),
            ("inputtype", "textquery".to_string()),
            ("fields", "place_id,name,geometry".to_string()),
            ("key", self.api_key()?.to_string()),
        ];
        if let (Some(lat), Some(lng)) = (latitude, longitude) {
            params.push((
                "locationbias",
                format!("circle:{}@{},{}", LOCATION_BIAS_RADIUS_M, lat, lng),
            ));
        }

        let url = self.url("findplacefromtext/json", &params)?;
        let response = ensure_success(self.http.get(url).send().await?).await?;
        let body: FindPlaceResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if body.status != "OK" {
            debug!(hotel = name, status = %body.status, "No place candidate");
            return Ok(None);
        }
        Ok(body.candidates.into_iter().next().map(|c| c.place_id))
    }

    pub async fn place_details(&self, place_id: &str, fields: &[&str]) -> Option<PlaceDetails> {
        let key = format!("{}|{}", place_id, fields.join(","));
        if let Some(cached) = self.details.get(&key) {
            return Some(cached);
        }

        match self.fetch_details(place_id, fields).await {
            Ok(Some(details)) => {
                self.details.insert(key, details.clone(), None);
                Some(details)
            }
            Ok(None) => None,
            Err(err) => {
                warn!(place_id, error = %err, "Place details lookup failed");
                None
            }
        }
    }

    async fn fetch_details(
        &self,
        place_id: &str,
        fields: &[&str],
    ) -> Result<Option<PlaceDetails>, ApiError> {
        let params = [
            ("place_id", place_id.to_string()),
            ("fields", fields.join(",")),
            ("key", self.api_key()?.to_string()),
        ];
        let url = self.url("details/json", &params)?;
        let response = ensure_success(self.http.get(url).send().await?).await?;
        let body: PlaceDetailsResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        if body.status != "OK" {
            debug!(place_id, status = %body.status, "Place details unavailable");
            return Ok(None);
        }
        Ok(body.result)
    }

    // Find the hotel's place and map its details. None when anything is missing.
    pub async fn enrich(
        &self,
        name: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Option<PlaceEnrichment> {
        if !self.is_configured() || name.trim().is_empty() {
            return None;
        }
        let place_id = self.find_place_id(name, latitude, longitude).await?;
        let details = self.place_details(&place_id, &DETAIL_FIELDS).await?;
        Some(map_place_details_to_hotel(&details))
    }

    // Streams a photo through this service so the API key is never exposed
    pub async fn fetch_photo(
        &self,
        reference: &str,
        max_width: u32,
    ) -> Result<PlacePhoto, ApiError> {
        let params = [
            ("maxwidth", max_width.to_string()),
            ("photo_reference", reference.to_string()),
            ("key", self.api_key()?.to_string()),
        ];
        let url = self.url("photo", &params)?;
        let response = ensure_success(self.http.get(url).send().await?).await?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_PHOTO_CONTENT_TYPE)
            .to_string();
        let bytes = response.bytes().await?;

        Ok(PlacePhoto { content_type, bytes })
    }
}
