// Shared harness: an in-process fake provider plus helpers to drive the router
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use travel_aggregator::{app, AppConfig, AppState, RetryConfig, StaticToken};

pub const TEST_TOKEN: &str = "test-token";

// Serves `router` on an ephemeral port and returns its base URL
pub async fn spawn_provider(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

pub fn test_config(base_url: &str) -> AppConfig {
    let mut config = AppConfig::default();
    config.provider.base_url = base_url.to_string();
    config.provider.client_id = Some("id".to_string());
    config.provider.client_secret = Some("secret".to_string());
    config.places.base_url = format!("{}/places", base_url);
    config.currency.rates_url_template = format!("{}/rates/{{base}}", base_url);
    config.retry = RetryConfig {
        max_retries: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        backoff_multiplier: 2.0,
        jitter_factor: 0.0,
    };
    config
}

pub fn test_app(config: &AppConfig) -> Router {
    let state = AppState::new(
        config,
        reqwest::Client::new(),
        Arc::new(StaticToken(TEST_TOKEN.to_string())),
    );
    app(state)
}

pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(router, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[derive(Default)]
pub struct Counter(AtomicUsize);

impl Counter {
    pub fn hit(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn del_bom_offers() -> Value {
    json!({
        "data": [{
            "id": "1",
            "itineraries": [{
                "duration": "PT2H10M",
                "segments": [{
                    "departure": { "iataCode": "DEL", "terminal": "3", "at": "2026-12-01T06:00:00" },
                    "arrival": { "iataCode": "BOM", "at": "2026-12-01T08:10:00" },
                    "carrierCode": "AI",
                    "number": "805",
                    "duration": "PT2H10M",
                    "numberOfStops": 0
                }]
            }],
            "price": { "currency": "INR", "total": "5400.00" },
            "validatingAirlineCodes": ["AI"]
        }],
        "dictionaries": {
            "locations": {
                "DEL": { "cityCode": "DEL", "countryCode": "IN" },
                "BOM": { "cityCode": "BOM", "countryCode": "IN" }
            },
            "carriers": { "AI": "AIR INDIA" }
        }
    })
}

pub fn hotel_list() -> Value {
    json!({
        "data": [
            {
                "hotelId": "HLPAR001",
                "name": "Hotel Lumiere",
                "iataCode": "PAR",
                "geoCode": { "latitude": 48.85, "longitude": 2.35 },
                "address": { "countryCode": "FR" }
            },
            {
                "hotelId": "HLPAR002",
                "name": "Maison Rive",
                "iataCode": "PAR",
                "address": { "countryCode": "FR" }
            }
        ]
    })
}

pub fn hotel_offers(currency: &str) -> Value {
    json!({
        "data": [
            {
                "hotel": { "hotelId": "HLPAR001", "rating": "4", "amenities": ["SWIMMING_POOL"] },
                "available": true,
                "offers": [{
                    "id": "OFF1",
                    "checkInDate": "2026-12-01",
                    "checkOutDate": "2026-12-03",
                    "room": { "typeEstimated": { "category": "DELUXE_ROOM" } },
                    "price": { "currency": currency, "total": "200.00" }
                }]
            },
            {
                "hotel": { "hotelId": "HLPAR002" },
                "available": false,
                "offers": []
            }
        ]
    })
}
