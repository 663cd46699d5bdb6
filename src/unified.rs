// Provider-agnostic view models returned by the HTTP routes
// Built fresh per response by the mappers; nothing here is persisted.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::supplier::TransferDistance;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedFlight {
    pub id: String,
    // "N/A" when the provider did not price the offer
    pub price_total: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    pub origin: Airport,
    pub destination: Airport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    // itineraries[0] is outbound, itineraries[1] (if any) the return
    pub itineraries: Vec<Itinerary>,
    pub raw_offer: Value,
}

impl UnifiedFlight {
    pub fn outbound(&self) -> Option<&Itinerary> {
        self.itineraries.first()
    }

    pub fn inbound(&self) -> Option<&Itinerary> {
        self.itineraries.get(1)
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Airport {
    pub iata_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Itinerary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub segments: Vec<FlightSegment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub departure: SegmentEndpoint,
    pub arrival: SegmentEndpoint,
    pub carrier_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier_name: Option<String>,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub stops: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentEndpoint {
    pub iata_code: String,
    pub at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedHotel {
    pub id: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub description: String,
    // Provider category, 0 when unknown
    pub stars: u8,
    // User rating from the places API, 0 until enriched
    pub rating: f64,
    pub review_count: u32,
    pub reviews: Vec<HotelReview>,
    pub price_per_night: f64,
    pub total_price: f64,
    pub nights: u32,
    pub currency: String,
    pub amenities: Vec<String>,
    pub image: String,
    pub images: Vec<String>,
    pub thumbnail_images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
    pub room_types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_link: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelReview {
    pub author_name: String,
    pub rating: f64,
    pub text: String,
    pub relative_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
}

// Secondary data merged into a hotel after a places lookup
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceEnrichment {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rating: f64,
    pub review_count: u32,
    pub thumbnail_images: Vec<String>,
    pub images: Vec<String>,
    pub short_address: String,
    pub full_address: String,
    pub reviews: Vec<HotelReview>,
    pub website: Option<String>,
    pub phone_number: Option<String>,
    pub maps_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub vehicle_code: String,
    pub category: String,
    pub category_label: String,
    pub seats: u32,
    pub bags: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub price: f64,
    pub currency: String,
    pub provider: TransferProvider,
    pub transfer_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<TransferDistance>,
    pub cancellation_rules: Vec<CancellationRule>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferProvider {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationSuggestion {
    pub iata_code: String,
    pub name: String,
    pub city_name: String,
    pub country_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_name: Option<String>,
    pub sub_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyRates {
    pub base: String,
    pub rates: HashMap<String, f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
