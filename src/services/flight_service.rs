// Flight search (availability first, offers as fallback) and offer pricing

use chrono::NaiveDate;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::FlightConfig;
use crate::error::ApiError;
use crate::http_client::ProviderClient;
use crate::retry::{retry_on_rate_limit, RetryConfig};
use crate::supplier::{
    DateTimeRange, FlightAvailabilityRequest, FlightSearchPayload, OriginDestination, Traveler,
};

pub const AVAILABILITY_PATH: &str = "/v1/shopping/availability/flight-availabilities";
pub const OFFERS_PATH: &str = "/v2/shopping/flight-offers";
pub const PRICING_PATH: &str = "/v1/shopping/flight-offers/pricing";

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSearchParams {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub max: u32,
    pub currency_code: Option<String>,
    pub non_stop: bool,
}

pub struct FlightService {
    client: ProviderClient,
    retry: RetryConfig,
    config: FlightConfig,
}

impl FlightService {
    pub fn new(client: ProviderClient, retry: RetryConfig, config: FlightConfig) -> Self {
        Self {
            client,
            retry,
            config,
        }
    }

    // Real-time availability first, priced offers when that fails or comes back empty.
    // The caller gets the provider payload untouched.
    pub async fn search(
        &self,
        params: &FlightSearchParams,
    ) -> Result<FlightSearchPayload, ApiError> {
        if self.config.availability_first {
            match self.search_availability(params).await {
                Ok(payload) if !payload.is_empty() => return Ok(payload),
                Ok(_) => info!(
                    origin = %params.origin,
                    destination = %params.destination,
                    "Availability search returned no data, falling back to offers"
                ),
                Err(err) => warn!(
                    origin = %params.origin,
                    destination = %params.destination,
                    error = %err,
                    "Availability search failed, falling back to offers"
                ),
            }
        }

        self.search_offers(params).await
    }

    pub async fn search_availability(
        &self,
        params: &FlightSearchParams,
    ) -> Result<FlightSearchPayload, ApiError> {
        let body = availability_request(params);
        debug!(legs = body.origin_destinations.len(), "Searching flight availability");

        let client = &self.client;
        let body = &body;
        retry_on_rate_limit(&self.retry, "flight-availability", move || async move {
            client
                .post::<_, FlightSearchPayload>(
                    AVAILABILITY_PATH,
                    body,
                    &[("X-HTTP-Method-Override", "GET")],
                )
                .await
        })
        .await
    }

    pub async fn search_offers(
        &self,
        params: &FlightSearchParams,
    ) -> Result<FlightSearchPayload, ApiError> {
        let query = offers_query(params);
        debug!(
            origin = %params.origin,
            destination = %params.destination,
            "Searching flight offers"
        );

        let client = &self.client;
        let query = &query;
        retry_on_rate_limit(&self.retry, "flight-offers", move || async move {
            client.get::<FlightSearchPayload>(OFFERS_PATH, query).await
        })
        .await
    }

    // Confirms the live price of an offer previously returned by search
    pub async fn price(&self, offer: &Value) -> Result<Value, ApiError> {
        let body = json!({
            "data": {
                "type": "flight-offers-pricing",
                "flightOffers": [offer],
            }
        });
        self.client.post(PRICING_PATH, &body, &[]).await
    }
}

pub fn availability_request(params: &FlightSearchParams) -> FlightAvailabilityRequest {
    let leg = |id: &str, from: &str, to: &str, date: NaiveDate| OriginDestination {
        id: id.to_string(),
        origin_location_code: from.to_string(),
        destination_location_code: to.to_string(),
        departure_date_time_range: DateTimeRange {
            date: date.format(DATE_FORMAT).to_string(),
            time: None,
        },
    };

    let mut origin_destinations =
        vec![leg("1", &params.origin, &params.destination, params.departure_date)];
    if let Some(return_date) = params.return_date {
        origin_destinations.push(leg("2", &params.destination, &params.origin, return_date));
    }

    FlightAvailabilityRequest {
        origin_destinations,
        travelers: (1..=params.adults.max(1))
            .map(|n| Traveler {
                id: n.to_string(),
                traveler_type: "ADULT".to_string(),
            })
            .collect(),
        sources: vec!["GDS".to_string()],
    }
}

pub fn offers_query(params: &FlightSearchParams) -> Vec<(&'static str, Option<String>)> {
    vec![
        ("originLocationCode", Some(params.origin.clone())),
        ("destinationLocationCode", Some(params.destination.clone())),
        ("departureDate", Some(params.departure_date.format(DATE_FORMAT).to_string())),
        ("returnDate", params.return_date.map(|d| d.format(DATE_FORMAT).to_string())),
        ("adults", Some(params.adults.to_string())),
        ("max", Some(params.max.to_string())),
        ("currencyCode", params.currency_code.clone()),
        ("nonStop", params.non_stop.then(|| "true".to_string())),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(return_date: Option<NaiveDate>) -> FlightSearchParams {
        FlightSearchParams {
            origin: "DEL".to_string(),
            destination: "BOM".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            return_date,
            adults: 2,
            max: 25,
            currency_code: None,
            non_stop: false,
        }
    }

    #[test]
    fn test_one_way_availability_request() {
        let request = availability_request(&params(None));
        assert_eq!(request.origin_destinations.len(), 1);
        assert_eq!(request.origin_destinations[0].origin_location_code, "DEL");
        assert_eq!(request.origin_destinations[0].departure_date_time_range.date, "2025-06-01");
        assert_eq!(request.travelers.len(), 2);
        assert_eq!(request.sources, vec!["GDS"]);
    }

    #[test]
    fn test_return_leg_is_reversed() {
        let request = availability_request(&params(NaiveDate::from_ymd_opt(2025, 6, 5)));
        assert_eq!(request.origin_destinations.len(), 2);

        let back = &request.origin_destinations[1];
        assert_eq!(back.id, "2");
        assert_eq!(back.origin_location_code, "BOM");
        assert_eq!(back.destination_location_code, "DEL");
        assert_eq!(back.departure_date_time_range.date, "2025-06-05");
    }

    #[test]
    fn test_offers_query_omits_unset_values() {
        let query = offers_query(&params(None));
        let lookup = |key: &str| query.iter().find(|(k, _)| *k == key).and_then(|(_, v)| v.clone());

        assert_eq!(lookup("departureDate").as_deref(), Some("2025-06-01"));
        assert_eq!(lookup("adults").as_deref(), Some("2"));
        assert_eq!(lookup("returnDate"), None);
        assert_eq!(lookup("currencyCode"), None);
        assert_eq!(lookup("nonStop"), None);
    }
}
