// Data structures for the GDS provider's JSON responses and request bodies
// Only the fields the mappers read are typed; everything else is ignored,
// except flight offers which also keep their raw JSON for re-pricing.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// Typed view of a JSON object that also keeps the object as received
#[derive(Debug, Clone)]
pub struct WithRaw<T> {
    pub typed: T,
    pub raw: Value,
}

// One entry of a provider batch. An entry that does not match the expected
// shape is kept as Malformed so the rest of the batch still deserializes.
#[derive(Debug, Clone)]
pub enum Lenient<T> {
    Valid(WithRaw<T>),
    Malformed { raw: Value, reason: String },
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&WithRaw<T>> {
        match self {
            Lenient::Valid(entry) => Some(entry),
            Lenient::Malformed { .. } => None,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Lenient<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        Ok(match T::deserialize(&raw) {
            Ok(typed) => Lenient::Valid(WithRaw { typed, raw }),
            Err(e) => Lenient::Malformed {
                raw,
                reason: e.to_string(),
            },
        })
    }
}

// ---- Flights ----

// The flight search endpoints have answered with different shapes over time.
// The shape is decided once here and normalized by the mapper; nothing past
// the mapping boundary sees either one.
#[derive(Debug, Clone)]
pub enum FlightSearchPayload {
    Offers(FlightOffersResponse),
    Availability(FlightAvailabilityResponse),
}

impl FlightSearchPayload {
    pub fn is_empty(&self) -> bool {
        match self {
            FlightSearchPayload::Offers(r) => r.data.is_empty(),
            FlightSearchPayload::Availability(r) => r.data.is_empty(),
        }
    }
}

// Availability entries carry segments directly, priced offers nest them in itineraries
fn looks_like_availability(value: &Value) -> bool {
    value
        .get("data")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .any(|e| e.get("segments").is_some() && e.get("itineraries").is_none())
        })
        .unwrap_or(false)
}

impl<'de> Deserialize<'de> for FlightSearchPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if !value.is_object() {
            return Err(de::Error::custom("flight search payload must be a JSON object"));
        }

        if looks_like_availability(&value) {
            FlightAvailabilityResponse::deserialize(value)
                .map(FlightSearchPayload::Availability)
                .map_err(de::Error::custom)
        } else {
            FlightOffersResponse::deserialize(value)
                .map(FlightSearchPayload::Offers)
                .map_err(de::Error::custom)
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightOffersResponse {
    #[serde(default)]
    pub data: Vec<Lenient<FlightOfferData>>,
    #[serde(default)]
    pub dictionaries: Option<FlightDictionaries>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOfferData {
    pub id: String,
    pub itineraries: Vec<Itinerary>,
    #[serde(default)]
    pub price: Option<FlightPrice>,
    #[serde(default)]
    pub validating_airline_codes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Itinerary {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<OfferSegment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferSegment {
    pub departure: FlightEndpoint,
    pub arrival: FlightEndpoint,
    #[serde(default)]
    pub carrier_code: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub number_of_stops: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightEndpoint {
    pub iata_code: String,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlightPrice {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightDictionaries {
    #[serde(default)]
    pub locations: HashMap<String, LocationEntry>,
    #[serde(default)]
    pub carriers: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationEntry {
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
}

// Real-time availability: one directional itinerary per entry, unpriced
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightAvailabilityResponse {
    #[serde(default)]
    pub data: Vec<Lenient<FlightAvailabilityOffer>>,
    #[serde(default)]
    pub dictionaries: Option<FlightDictionaries>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightAvailabilityOffer {
    pub id: String,
    #[serde(default)]
    pub duration: Option<String>,
    pub segments: Vec<OfferSegment>,
}

// Request body for the availability endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightAvailabilityRequest {
    pub origin_destinations: Vec<OriginDestination>,
    pub travelers: Vec<Traveler>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginDestination {
    pub id: String,
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date_time_range: DateTimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct DateTimeRange {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Traveler {
    pub id: String,
    pub traveler_type: String,
}

// ---- Hotels ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelListResponse {
    #[serde(default)]
    pub data: Vec<Lenient<HotelListItem>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelListItem {
    pub hotel_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub geo_code: Option<GeoCode>,
    #[serde(default)]
    pub address: Option<HotelAddress>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GeoCode {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelAddress {
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HotelOffersResponse {
    #[serde(default)]
    pub data: Vec<Lenient<HotelOfferData>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelOfferData {
    pub hotel: HotelInfo,
    #[serde(default)]
    pub offers: Vec<HotelOffer>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelInfo {
    pub hotel_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    // Star category, sent as a string ("4")
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub amenities: Option<Vec<String>>,
    #[serde(default)]
    pub media: Vec<HotelMedia>,
    #[serde(default)]
    pub description: Option<TextBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelMedia {
    pub uri: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOffer {
    #[serde(default)]
    pub check_in_date: Option<String>,
    #[serde(default)]
    pub check_out_date: Option<String>,
    #[serde(default)]
    pub room: Option<HotelRoom>,
    pub price: HotelPrice,
    #[serde(default)]
    pub policies: Option<HotelPolicies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelRoom {
    #[serde(default)]
    pub type_estimated: Option<RoomTypeEstimated>,
    #[serde(default)]
    pub description: Option<TextBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomTypeEstimated {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelPrice {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelPolicies {
    #[serde(default)]
    pub cancellations: Vec<HotelCancellation>,
    #[serde(default)]
    pub refundable: Option<RefundablePolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelCancellation {
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub description: Option<TextBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundablePolicy {
    #[serde(default)]
    pub cancellation_refund: Option<String>,
}

// ---- Transfers ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferOffersResponse {
    #[serde(default)]
    pub data: Vec<Lenient<TransferOfferData>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOfferData {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub transfer_type: Option<String>,
    pub vehicle: TransferVehicle,
    #[serde(default)]
    pub service_provider: Option<TransferServiceProvider>,
    pub quotation: TransferQuotation,
    #[serde(default)]
    pub cancellation_rules: Vec<TransferCancellationRule>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub distance: Option<TransferDistance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferVehicle {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "imageURL")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub seats: Vec<CountEntry>,
    #[serde(default)]
    pub baggages: Vec<CountEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CountEntry {
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferServiceProvider {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuotation {
    #[serde(default)]
    pub monetary_amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferCancellationRule {
    #[serde(default)]
    pub rule_description: Option<String>,
    #[serde(default)]
    pub fee_type: Option<String>,
    #[serde(default)]
    pub fee_value: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransferDistance {
    pub value: f64,
    pub unit: String,
}

// Request body for the transfer offers endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSearchRequest {
    pub start_location_code: String,
    pub end_address_line: String,
    pub end_city_name: String,
    pub end_zip_code: String,
    pub end_country_code: String,
    pub end_name: String,
    pub end_geo_code: String,
    pub transfer_type: String,
    pub start_date_time: String,
    pub passengers: u32,
}

// ---- Locations ----

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSearchResponse {
    #[serde(default)]
    pub data: Vec<Lenient<LocationData>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationData {
    #[serde(default)]
    pub sub_type: String,
    #[serde(default)]
    pub name: String,
    pub iata_code: String,
    #[serde(default)]
    pub address: LocationAddress,
    #[serde(default)]
    pub analytics: Option<LocationAnalytics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationAddress {
    #[serde(default)]
    pub city_name: Option<String>,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub country_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationAnalytics {
    #[serde(default)]
    pub travelers: Option<TravelerAnalytics>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TravelerAnalytics {
    #[serde(default)]
    pub score: Option<f64>,
}
