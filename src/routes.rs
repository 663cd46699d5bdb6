// HTTP surface: shared state, router and handlers
// Every handler validates first, then calls a service and a mapper. Failures
// always leave as the {"error":{"code","message"}} envelope.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::TokenProvider;
use crate::concurrency::map_with_concurrency;
use crate::config::AppConfig;
use crate::currency::{resolve_request_currency, try_convert_amount};
use crate::error::RouteError;
use crate::mappers::{
    apply_place_enrichment, map_hotel_offers_response, map_location_response,
    map_offers_to_unified, map_transfer_offers_response, HotelMetaMap,
};
use crate::http_client::ProviderClient;
use crate::services::{
    CurrencyService, FlightService, HotelService, LocationService, PlacesService, TransferService,
};
use crate::unified::UnifiedHotel;
use crate::validation::{
    location_keyword, validate_flight_price, validate_flight_search, validate_hotel_detail,
    validate_hotel_search, validate_photo, validate_transfer_search, FlightPriceBody,
    FlightSearchBody, HotelDetailQuery, HotelSearchBody, LocationQuery, PhotoQuery, RatesQuery,
    TransferSearchBody,
};

const PHOTO_CACHE_CONTROL: &str = "public, max-age=86400";

#[derive(Debug, Clone)]
pub struct RouteSettings {
    pub default_flight_max: u32,
    pub enrichment_limit: usize,
    pub enrichment_concurrency: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<FlightService>,
    pub hotels: Arc<HotelService>,
    pub transfers: Arc<TransferService>,
    pub locations: Arc<LocationService>,
    pub places: Arc<PlacesService>,
    pub currency: Arc<CurrencyService>,
    pub settings: Arc<RouteSettings>,
}

impl AppState {
    // Builds every service once; handlers share them through the router state
    pub fn new(config: &AppConfig, http: reqwest::Client, tokens: Arc<dyn TokenProvider>) -> Self {
        let provider = ProviderClient::new(config.provider.api_base(), http.clone(), tokens);

        Self {
            flights: Arc::new(FlightService::new(
                provider.clone(),
                config.retry.clone(),
                config.flights.clone(),
            )),
            hotels: Arc::new(HotelService::new(provider.clone(), config.hotels.clone())),
            transfers: Arc::new(TransferService::new(provider.clone())),
            locations: Arc::new(LocationService::new(provider)),
            places: Arc::new(PlacesService::new(http.clone(), &config.places)),
            currency: Arc::new(CurrencyService::new(http, &config.currency)),
            settings: Arc::new(RouteSettings {
                default_flight_max: config.flights.default_max,
                enrichment_limit: config.places.enrichment_limit,
                enrichment_concurrency: config.places.enrichment_concurrency,
            }),
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT_LANGUAGE]);

    Router::new()
        .route("/health", get(health))
        .route("/api/flights/search", post(search_flights))
        .route("/api/flights/price", post(price_flight))
        .route("/api/hotels/search", post(search_hotels))
        .route("/api/hotels/{hotel_id}", get(hotel_detail))
        .route("/api/locations/search", get(search_locations))
        .route("/api/transfers/search", post(search_transfers))
        .route("/api/currency/rates", get(currency_rates))
        .route("/api/places/photo", get(place_photo))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Malformed JSON or query strings are reported like any other validation failure
fn rejected(err: impl Display) -> RouteError {
    RouteError::validation(format!("Invalid request: {}", err))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn search_flights(
    State(state): State<AppState>,
    body: Result<Json<FlightSearchBody>, JsonRejection>,
) -> Result<Json<Value>, RouteError> {
    let Json(body) = body.map_err(rejected)?;
    let params = validate_flight_search(&body, state.settings.default_flight_max)?;

    let payload = state
        .flights
        .search(&params)
        .await
        .map_err(|e| RouteError::upstream("SEARCH_FAILED", &e))?;

    let currency = params
        .currency_code
        .clone()
        .unwrap_or_else(|| state.currency.default_currency().to_string());
    let flights = map_offers_to_unified(&payload, &currency);
    info!(
        origin = %params.origin,
        destination = %params.destination,
        count = flights.len(),
        "Flight search complete"
    );

    Ok(Json(json!({ "flights": flights })))
}

async fn price_flight(
    State(state): State<AppState>,
    body: Result<Json<FlightPriceBody>, JsonRejection>,
) -> Result<Json<Value>, RouteError> {
    let Json(body) = body.map_err(rejected)?;
    let offer = validate_flight_price(&body)?;

    let priced = state
        .flights
        .price(&offer)
        .await
        .map_err(|e| RouteError::upstream("PRICING_FAILED", &e))?;
    Ok(Json(priced))
}

async fn search_hotels(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<HotelSearchBody>, JsonRejection>,
) -> Result<Json<Value>, RouteError> {
    let Json(body) = body.map_err(rejected)?;
    let mut params = validate_hotel_search(&body)?;

    let display_currency = params
        .stay
        .currency
        .clone()
        .unwrap_or_else(|| resolve_request_currency(&headers, state.currency.default_currency()));
    params.stay.currency = Some(display_currency.clone());

    let result = state
        .hotels
        .search(&params)
        .await
        .map_err(|e| RouteError::upstream("SEARCH_FAILED", &e))?;

    let mut hotels = map_hotel_offers_response(&result.offers, &result.meta);
    convert_hotel_prices(&state.currency, &mut hotels, &display_currency).await;
    enrich_hotels(&state.places, &state.settings, &mut hotels).await;
    let hotels = body.filters.apply(hotels);

    info!(city = %params.city_code, count = hotels.len(), "Hotel search complete");
    Ok(Json(json!({ "hotels": hotels })))
}

// Providers sometimes quote in the property's local currency
async fn convert_hotel_prices(
    currency: &CurrencyService,
    hotels: &mut [UnifiedHotel],
    target: &str,
) {
    if hotels.iter().all(|h| h.currency == target) {
        return;
    }
    let rates = match currency.rates(Some(target)).await {
        Ok(rates) => rates,
        Err(err) => {
            debug!(
                currency = target,
                error = %err,
                "No rates available, keeping provider currency"
            );
            return;
        }
    };

    for hotel in hotels.iter_mut().filter(|h| h.currency != target) {
        let converted = (
            try_convert_amount(hotel.total_price, &hotel.currency, target, &rates),
            try_convert_amount(hotel.price_per_night, &hotel.currency, target, &rates),
        );
        if let (Some(total), Some(per_night)) = converted {
            hotel.total_price = total;
            hotel.price_per_night = per_night;
            hotel.currency = target.to_string();
        }
    }
}

// Enriches the first hotels with place data, a few lookups at a time.
// A failed lookup leaves its hotel as it was.
async fn enrich_hotels(
    places: &PlacesService,
    settings: &RouteSettings,
    hotels: &mut [UnifiedHotel],
) {
    if !places.is_configured() || hotels.is_empty() {
        return;
    }

    let count = hotels.len().min(settings.enrichment_limit);
    let lookups: Vec<(String, Option<f64>, Option<f64>)> = hotels[..count]
        .iter()
        .map(|h| (h.name.clone(), h.latitude, h.longitude))
        .collect();

    let limit = settings.enrichment_concurrency;
    let enrichments = map_with_concurrency(&lookups, limit, move |lookup| {
        let (name, latitude, longitude) = lookup.clone();
        async move { Ok::<_, Infallible>(places.enrich(&name, latitude, longitude).await) }
    })
    .await;
    let enrichments = match enrichments {
        Ok(enrichments) => enrichments,
        Err(never) => match never {},
    };

    let mut enriched = 0;
    for (hotel, enrichment) in hotels.iter_mut().zip(enrichments) {
        if let Some(enrichment) = enrichment {
            apply_place_enrichment(hotel, enrichment);
            enriched += 1;
        }
    }
    debug!(requested = count, enriched, "Hotel enrichment complete");
}

async fn hotel_detail(
    State(state): State<AppState>,
    Path(hotel_id): Path<String>,
    query: Result<Query<HotelDetailQuery>, QueryRejection>,
) -> Result<Json<Value>, RouteError> {
    let Query(query) = query.map_err(rejected)?;
    let stay = validate_hotel_detail(&hotel_id, &query)?;
    let hotel_id = hotel_id.trim().to_ascii_uppercase();

    let offers = match state.hotels.hotel_offer(&hotel_id, &stay).await {
        Ok(offers) => offers,
        Err(err) if err.status() == Some(400) => {
            return Err(RouteError::invalid_request(format!(
                "Invalid search parameters or hotel ID: {}",
                err.describe()
            )))
        }
        Err(err) => return Err(RouteError::upstream("FETCH_FAILED", &err)),
    };

    let mut hotel = map_hotel_offers_response(&offers, &HotelMetaMap::new())
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::not_found("Hotel not found or no offers available"))?;

    if let Some(enrichment) = state
        .places
        .enrich(&hotel.name, hotel.latitude, hotel.longitude)
        .await
    {
        apply_place_enrichment(&mut hotel, enrichment);
    }

    Ok(Json(json!({ "hotel": hotel })))
}

async fn search_locations(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> Result<Json<Value>, RouteError> {
    let Query(query) = query.map_err(rejected)?;
    let Some(keyword) = location_keyword(&query) else {
        return Ok(Json(json!({ "data": [] })));
    };

    let response = state
        .locations
        .search(&keyword)
        .await
        .map_err(|e| RouteError::upstream("SEARCH_FAILED", &e))?;
    Ok(Json(json!({ "data": map_location_response(&response) })))
}

async fn search_transfers(
    State(state): State<AppState>,
    body: Result<Json<TransferSearchBody>, JsonRejection>,
) -> Result<Json<Value>, RouteError> {
    let Json(body) = body.map_err(rejected)?;
    let request = validate_transfer_search(&body)?;

    let response = state
        .transfers
        .search(&request)
        .await
        .map_err(|e| RouteError::upstream("SEARCH_FAILED", &e))?;
    Ok(Json(json!({ "vehicles": map_transfer_offers_response(&response.data) })))
}

async fn currency_rates(
    State(state): State<AppState>,
    query: Result<Query<RatesQuery>, QueryRejection>,
) -> Result<Response, RouteError> {
    let Query(query) = query.map_err(rejected)?;
    match state.currency.rates(query.base.as_deref()).await {
        Ok(rates) => Ok(Json(rates).into_response()),
        Err(err) => Err(RouteError::new(
            StatusCode::BAD_GATEWAY,
            "RATES_UNAVAILABLE",
            err.describe(),
        )),
    }
}

async fn place_photo(
    State(state): State<AppState>,
    query: Result<Query<PhotoQuery>, QueryRejection>,
) -> Result<Response, RouteError> {
    let Query(query) = query.map_err(rejected)?;
    let request = validate_photo(&query)?;
    if !state.places.is_configured() {
        return Err(RouteError::config("Places API key is not configured"));
    }

    let photo = state
        .places
        .fetch_photo(&request.reference, request.max_width)
        .await
        .map_err(|err| {
            let status = err
                .status()
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::BAD_GATEWAY);
            RouteError::new(status, "PHOTO_FETCH_FAILED", "Failed to fetch photo")
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, photo.content_type),
            (header::CACHE_CONTROL, PHOTO_CACHE_CONTROL.to_string()),
        ],
        photo.bytes,
    )
        .into_response())
}
