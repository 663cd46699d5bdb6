// Pure conversions from provider payloads into the unified view models
// No I/O happens here. Missing optional fields degrade to defaults and
// malformed batch entries are skipped with a warning.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::warn;

use crate::places_response::PlaceDetails;
use crate::supplier::{
    FlightAvailabilityResponse, FlightDictionaries, FlightOffersResponse, FlightSearchPayload,
    HotelListItem, HotelOfferData, HotelPolicies, Lenient, LocationData, LocationSearchResponse,
    OfferSegment, TransferOfferData, WithRaw,
};
use crate::unified::{
    Airport, CancellationRule, FlightSegment, HotelReview, Itinerary, LocationSuggestion,
    PlaceEnrichment, SegmentEndpoint, TransferProvider, UnifiedFlight, UnifiedHotel, Vehicle,
};

pub const PRICE_NOT_AVAILABLE: &str = "N/A";
pub const DEFAULT_HOTEL_CURRENCY: &str = "USD";
pub const DEFAULT_HOTEL_DESCRIPTION: &str = "Comfortable stay with modern amenities.";
pub const DEFAULT_AMENITIES: [&str; 4] = ["WiFi", "Pool", "Gym", "Restaurant"];
pub const PHOTO_PROXY_PATH: &str = "/api/places/photo";
pub const PHOTO_MAX_WIDTH: u32 = 400;

const MAX_THUMBNAILS: usize = 3;
const MAX_REVIEWS: usize = 5;
const SECONDS_PER_DAY: i64 = 86_400;

const FALLBACK_IMAGES: [&str; 6] = [
    "/images/hotels/fallback-1.jpg",
    "/images/hotels/fallback-2.jpg",
    "/images/hotels/fallback-3.jpg",
    "/images/hotels/fallback-4.jpg",
    "/images/hotels/fallback-5.jpg",
    "/images/hotels/fallback-6.jpg",
];

// Yields (position, entry) for well-formed entries, logging the rest
fn valid_entries<'a, T>(
    entries: &'a [Lenient<T>],
    kind: &'static str,
) -> impl Iterator<Item = (usize, &'a WithRaw<T>)> + 'a {
    entries
        .iter()
        .enumerate()
        .filter_map(move |(index, entry)| match entry {
            Lenient::Valid(valid) => Some((index, valid)),
            Lenient::Malformed { reason, .. } => {
                warn!(kind, index, %reason, "Skipping malformed provider entry");
                None
            }
        })
}

// ---- Flights ----

pub fn map_offers_to_unified(
    payload: &FlightSearchPayload,
    default_currency: &str,
) -> Vec<UnifiedFlight> {
    match payload {
        FlightSearchPayload::Offers(response) => map_priced_offers(response, default_currency),
        FlightSearchPayload::Availability(response) => {
            map_availability_offers(response, default_currency)
        }
    }
}

fn map_priced_offers(
    response: &FlightOffersResponse,
    default_currency: &str,
) -> Vec<UnifiedFlight> {
    let dictionaries = response.dictionaries.clone().unwrap_or_default();

    valid_entries(&response.data, "flight-offer")
        .filter_map(|(index, entry)| {
            let offer = &entry.typed;
            let itineraries: Vec<Itinerary> = offer
                .itineraries
                .iter()
                .map(|itinerary| Itinerary {
                    duration: itinerary.duration.clone(),
                    segments: map_segments(&itinerary.segments, &dictionaries),
                })
                .collect();

            let Some(outbound) = itineraries.first().filter(|i| !i.segments.is_empty()) else {
                warn!(
                    index,
                    offer_id = %offer.id,
                    "Skipping flight offer without outbound segments"
                );
                return None;
            };

            let carrier_code = offer
                .validating_airline_codes
                .first()
                .cloned()
                .or_else(|| outbound.segments.first().map(|s| s.carrier_code.clone()))
                .filter(|c| !c.is_empty());

            let price = offer.price.as_ref();
            Some(UnifiedFlight {
                id: offer.id.clone(),
                price_total: price
                    .and_then(|p| p.total.clone())
                    .unwrap_or_else(|| PRICE_NOT_AVAILABLE.to_string()),
                currency: price
                    .and_then(|p| p.currency.clone())
                    .unwrap_or_else(|| default_currency.to_string()),
                carrier_name: carrier_code.as_deref().map(|c| carrier_name(c, &dictionaries)),
                carrier_code,
                origin: endpoint_airport(outbound, true, &dictionaries),
                destination: endpoint_airport(outbound, false, &dictionaries),
                duration: outbound.duration.clone(),
                raw_offer: entry.raw.clone(),
                itineraries,
            })
        })
        .collect()
}

// Availability entries are unpriced and cover a single direction each
fn map_availability_offers(
    response: &FlightAvailabilityResponse,
    default_currency: &str,
) -> Vec<UnifiedFlight> {
    let dictionaries = response.dictionaries.clone().unwrap_or_default();

    valid_entries(&response.data, "flight-availability")
        .filter_map(|(index, entry)| {
            let offer = &entry.typed;
            let segments = map_segments(&offer.segments, &dictionaries);
            if segments.is_empty() {
                warn!(index, offer_id = %offer.id, "Skipping availability entry without segments");
                return None;
            }

            let itinerary = Itinerary {
                duration: offer.duration.clone(),
                segments,
            };
            let carrier_code = itinerary
                .segments
                .first()
                .map(|s| s.carrier_code.clone())
                .filter(|c| !c.is_empty());

            Some(UnifiedFlight {
                id: offer.id.clone(),
                price_total: PRICE_NOT_AVAILABLE.to_string(),
                currency: default_currency.to_string(),
                carrier_name: carrier_code.as_deref().map(|c| carrier_name(c, &dictionaries)),
                carrier_code,
                origin: endpoint_airport(&itinerary, true, &dictionaries),
                destination: endpoint_airport(&itinerary, false, &dictionaries),
                duration: offer.duration.clone(),
                raw_offer: entry.raw.clone(),
                itineraries: vec![itinerary],
            })
        })
        .collect()
}

fn map_segments(
    segments: &[OfferSegment],
    dictionaries: &FlightDictionaries,
) -> Vec<FlightSegment> {
    segments
        .iter()
        .map(|seg| {
            let carrier_code = seg.carrier_code.clone().unwrap_or_default();
            FlightSegment {
                departure: SegmentEndpoint {
                    iata_code: seg.departure.iata_code.clone(),
                    at: seg.departure.at.clone(),
                    terminal: seg.departure.terminal.clone(),
                },
                arrival: SegmentEndpoint {
                    iata_code: seg.arrival.iata_code.clone(),
                    at: seg.arrival.at.clone(),
                    terminal: seg.arrival.terminal.clone(),
                },
                carrier_name: dictionaries.carriers.get(&carrier_code).cloned(),
                carrier_code,
                number: seg.number.clone().unwrap_or_default(),
                duration: seg.duration.clone(),
                stops: seg.number_of_stops,
            }
        })
        .collect()
}

fn carrier_name(code: &str, dictionaries: &FlightDictionaries) -> String {
    dictionaries
        .carriers
        .get(code)
        .cloned()
        .unwrap_or_else(|| code.to_string())
}

fn endpoint_airport(
    itinerary: &Itinerary,
    origin: bool,
    dictionaries: &FlightDictionaries,
) -> Airport {
    let code = if origin {
        itinerary.segments.first().map(|s| s.departure.iata_code.clone())
    } else {
        itinerary.segments.last().map(|s| s.arrival.iata_code.clone())
    }
    .unwrap_or_default();

    let location = dictionaries.locations.get(&code);
    Airport {
        city: location.and_then(|l| l.city_code.clone()),
        country: location.and_then(|l| l.country_code.clone()),
        iata_code: code,
    }
}

// ---- Hotels ----

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HotelMeta {
    pub name: Option<String>,
    pub city_code: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub type HotelMetaMap = HashMap<String, HotelMeta>;

pub fn build_hotel_meta_map(hotels: &[HotelListItem]) -> HotelMetaMap {
    hotels
        .iter()
        .map(|hotel| {
            let meta = HotelMeta {
                name: hotel.name.clone(),
                city_code: hotel.iata_code.clone(),
                country_code: hotel.address.as_ref().and_then(|a| a.country_code.clone()),
                latitude: hotel.geo_code.map(|g| g.latitude),
                longitude: hotel.geo_code.map(|g| g.longitude),
            };
            (hotel.hotel_id.clone(), meta)
        })
        .collect()
}

pub fn map_hotel_offers_response(
    offers: &[Lenient<HotelOfferData>],
    meta: &HotelMetaMap,
) -> Vec<UnifiedHotel> {
    valid_entries(offers, "hotel-offer")
        .filter_map(|(_, entry)| map_hotel_offer(&entry.typed, meta))
        .collect()
}

// Hotels without any bookable offer are dropped
pub fn map_hotel_offer(data: &HotelOfferData, meta: &HotelMetaMap) -> Option<UnifiedHotel> {
    let hotel = &data.hotel;
    let Some(best) = data.offers.first() else {
        tracing::debug!(hotel_id = %hotel.hotel_id, "Hotel has no offers, skipping");
        return None;
    };
    let meta = meta.get(&hotel.hotel_id).cloned().unwrap_or_default();

    let total_price = parse_amount(best.price.total.as_deref(), &hotel.hotel_id);
    let nights = nights_between(best.check_in_date.as_deref(), best.check_out_date.as_deref());

    let images: Vec<String> = hotel
        .media
        .iter()
        .map(|m| m.uri.clone())
        .filter(|uri| !uri.is_empty())
        .collect();
    let image = images
        .first()
        .cloned()
        .unwrap_or_else(|| fallback_image(&hotel.hotel_id).to_string());

    let amenities = match hotel.amenities.as_deref() {
        Some(codes) if !codes.is_empty() => codes.iter().map(|c| title_case(c)).collect(),
        _ => DEFAULT_AMENITIES.iter().map(|a| a.to_string()).collect(),
    };

    let description = best
        .room
        .as_ref()
        .and_then(|r| r.description.as_ref())
        .or(hotel.description.as_ref())
        .map(|d| d.text.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_HOTEL_DESCRIPTION.to_string());

    let mut room_types: Vec<String> = Vec::new();
    for category in data
        .offers
        .iter()
        .filter_map(|o| o.room.as_ref()?.type_estimated.as_ref()?.category.as_deref())
    {
        let label = title_case(category);
        if !room_types.contains(&label) {
            room_types.push(label);
        }
    }

    Some(UnifiedHotel {
        id: hotel.hotel_id.clone(),
        name: meta
            .name
            .or_else(|| hotel.name.clone())
            .unwrap_or_else(|| hotel.hotel_id.clone()),
        city: meta
            .city_code
            .or_else(|| hotel.city_code.clone())
            .unwrap_or_default(),
        country: meta.country_code.unwrap_or_else(|| "Unknown".to_string()),
        description,
        stars: parse_stars(hotel.rating.as_deref()),
        rating: 0.0,
        review_count: 0,
        reviews: Vec::new(),
        price_per_night: total_price / f64::from(nights),
        total_price,
        nights,
        currency: best
            .price
            .currency
            .clone()
            .unwrap_or_else(|| DEFAULT_HOTEL_CURRENCY.to_string()),
        amenities,
        thumbnail_images: images.iter().take(MAX_THUMBNAILS).cloned().collect(),
        image,
        images,
        latitude: hotel.latitude.or(meta.latitude),
        longitude: hotel.longitude.or(meta.longitude),
        short_address: None,
        full_address: None,
        room_types,
        cancellation_policy: best.policies.as_ref().and_then(cancellation_text),
        booking_link: None,
    })
}

fn parse_amount(value: Option<&str>, hotel_id: &str) -> f64 {
    match value.map(|v| v.trim().parse::<f64>()) {
        Some(Ok(amount)) if amount.is_finite() => amount,
        Some(_) => {
            warn!(hotel_id, value = ?value, "Unparseable offer total, using 0");
            0.0
        }
        None => 0.0,
    }
}

fn parse_stars(category: Option<&str>) -> u8 {
    category
        .and_then(|c| c.trim().parse::<u8>().ok())
        .map(|stars| stars.min(5))
        .unwrap_or(0)
}

fn cancellation_text(policies: &HotelPolicies) -> Option<String> {
    if let Some(rule) = policies.cancellations.first() {
        if let Some(text) = rule
            .description
            .as_ref()
            .map(|d| d.text.trim())
            .filter(|t| !t.is_empty())
        {
            return Some(text.to_string());
        }
        if let Some(deadline) = rule.deadline.as_deref() {
            return Some(format!("Free cancellation until {}", deadline));
        }
    }

    match policies
        .refundable
        .as_ref()
        .and_then(|r| r.cancellation_refund.as_deref())
    {
        Some("NON_REFUNDABLE") => Some("Non-refundable".to_string()),
        Some("REFUNDABLE_UP_TO_DEADLINE") => Some("Refundable up to the deadline".to_string()),
        _ => None,
    }
}

// Whole nights between two dates, rounded up and never below 1
pub fn nights_between(check_in: Option<&str>, check_out: Option<&str>) -> u32 {
    let (Some(start), Some(end)) = (
        check_in.and_then(parse_instant),
        check_out.and_then(parse_instant),
    ) else {
        return 1;
    };

    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let nights = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(nights).unwrap_or(u32::MAX).max(1)
}

fn parse_instant(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").ok()
}

// Same id always selects the same placeholder
pub fn fallback_image(id: &str) -> &'static str {
    let hash = id
        .bytes()
        .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(u32::from(b)));
    FALLBACK_IMAGES[(hash as usize) % FALLBACK_IMAGES.len()]
}

// SWIMMING_POOL -> "Swimming Pool"
pub fn title_case(code: &str) -> String {
    code.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// ---- Places ----

// Photo links go through our own proxy route so the places API key stays server-side
pub fn photo_proxy_url(reference: &str, max_width: u32) -> String {
    let query = reqwest::Url::parse_with_params(
        "http://localhost/",
        &[("ref", reference), ("maxWidth", &max_width.to_string())],
    )
    .ok()
    .and_then(|url| url.query().map(str::to_string))
    .unwrap_or_default();
    format!("{}?{}", PHOTO_PROXY_PATH, query)
}

pub fn map_place_details_to_hotel(details: &PlaceDetails) -> PlaceEnrichment {
    let images: Vec<String> = details
        .photos
        .iter()
        .map(|p| photo_proxy_url(&p.photo_reference, PHOTO_MAX_WIDTH))
        .collect();

    let reviews = details
        .reviews
        .iter()
        .take(MAX_REVIEWS)
        .map(|r| HotelReview {
            author_name: r.author_name.clone(),
            rating: r.rating,
            text: r.text.clone(),
            relative_time: r.relative_time_description.clone().unwrap_or_default(),
            profile_photo_url: r.profile_photo_url.clone(),
        })
        .collect();

    let full_address = details.formatted_address.clone().unwrap_or_default();
    let short_address = full_address
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();
    let location = details.geometry.as_ref().map(|g| g.location);

    PlaceEnrichment {
        latitude: location.map(|l| l.lat),
        longitude: location.map(|l| l.lng),
        rating: details.rating.unwrap_or(0.0),
        review_count: details.user_ratings_total.unwrap_or(0),
        thumbnail_images: images.iter().take(MAX_THUMBNAILS).cloned().collect(),
        images,
        short_address,
        full_address,
        reviews,
        website: details.website.clone(),
        phone_number: details.formatted_phone_number.clone(),
        maps_url: details.url.clone(),
    }
}

pub fn apply_place_enrichment(hotel: &mut UnifiedHotel, enrichment: PlaceEnrichment) {
    hotel.rating = enrichment.rating;
    hotel.review_count = enrichment.review_count;
    hotel.reviews = enrichment.reviews;

    if !enrichment.images.is_empty() {
        hotel.image = enrichment.images[0].clone();
        hotel.thumbnail_images = enrichment.thumbnail_images;
        hotel.images = enrichment.images;
    }
    if hotel.latitude.is_none() || hotel.longitude.is_none() {
        hotel.latitude = enrichment.latitude.or(hotel.latitude);
        hotel.longitude = enrichment.longitude.or(hotel.longitude);
    }
    if !enrichment.short_address.is_empty() {
        hotel.short_address = Some(enrichment.short_address);
    }
    if !enrichment.full_address.is_empty() {
        hotel.full_address = Some(enrichment.full_address);
    }
    if hotel.booking_link.is_none() {
        hotel.booking_link = enrichment.website.or(enrichment.maps_url);
    }
}

// ---- Transfers ----

pub fn category_label(category: &str) -> String {
    match category {
        "ST" => "Standard".to_string(),
        "BU" => "Business".to_string(),
        "FC" => "First Class".to_string(),
        other => other.to_string(),
    }
}

// "PT2H10M" -> 130. Seconds are ignored.
pub fn parse_duration_minutes(iso: &str) -> Option<u32> {
    let rest = iso.trim().strip_prefix("PT")?;
    let mut total: u32 = 0;
    let mut digits = String::new();

    for ch in rest.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let value: u32 = digits.parse().unwrap_or(0);
        digits.clear();
        match ch {
            'H' => total = total.saturating_add(value.saturating_mul(60)),
            'M' => total = total.saturating_add(value),
            _ => break,
        }
    }
    Some(total)
}

pub fn map_transfer_offers_response(offers: &[Lenient<TransferOfferData>]) -> Vec<Vehicle> {
    valid_entries(offers, "transfer-offer")
        .map(|(index, entry)| map_transfer_offer(index, &entry.typed))
        .collect()
}

fn map_transfer_offer(index: usize, offer: &TransferOfferData) -> Vehicle {
    let vehicle = &offer.vehicle;
    let category = vehicle
        .category
        .clone()
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "ST".to_string());
    let id = offer
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("transfer-{}", index));

    let price = offer
        .quotation
        .monetary_amount
        .as_deref()
        .and_then(|a| a.trim().parse::<f64>().ok())
        .unwrap_or_else(|| {
            warn!(transfer_id = %id, "Transfer offer without a usable amount");
            0.0
        });

    let provider = offer.service_provider.as_ref();

    Vehicle {
        name: vehicle
            .description
            .clone()
            .or_else(|| vehicle.code.clone())
            .unwrap_or_else(|| category_label(&category)),
        vehicle_code: vehicle.code.clone().unwrap_or_default(),
        category_label: category_label(&category),
        category,
        seats: vehicle.seats.first().map(|s| s.count).unwrap_or(0),
        bags: vehicle.baggages.first().map(|b| b.count).unwrap_or(0),
        image_url: vehicle.image_url.clone(),
        price,
        currency: offer.quotation.currency_code.clone().unwrap_or_default(),
        provider: TransferProvider {
            name: provider.and_then(|p| p.name.clone()).unwrap_or_default(),
            logo_url: provider.and_then(|p| p.logo_url.clone()),
        },
        transfer_type: offer
            .transfer_type
            .clone()
            .unwrap_or_else(|| "PRIVATE".to_string()),
        duration_minutes: offer.duration.as_deref().and_then(parse_duration_minutes),
        duration: offer.duration.clone(),
        distance: offer.distance.clone(),
        cancellation_rules: offer
            .cancellation_rules
            .iter()
            .map(|rule| CancellationRule {
                rule_description: rule.rule_description.clone(),
                fee_type: rule.fee_type.clone(),
                fee_value: rule.fee_value.clone(),
                currency_code: rule.currency_code.clone(),
            })
            .collect(),
        id,
    }
}

// ---- Locations ----

impl From<&LocationData> for LocationSuggestion {
    fn from(location: &LocationData) -> Self {
        Self {
            iata_code: location.iata_code.clone(),
            name: location.name.clone(),
            city_name: location.address.city_name.clone().unwrap_or_default(),
            country_code: location.address.country_code.clone(),
            country_name: location.address.country_name.clone(),
            sub_type: location.sub_type.clone(),
            score: location
                .analytics
                .as_ref()
                .and_then(|a| a.travelers.as_ref())
                .and_then(|t| t.score),
        }
    }
}

// Most travelled first; an unscored entry ranks as 0
pub fn map_location_response(response: &LocationSearchResponse) -> Vec<LocationSuggestion> {
    let mut suggestions: Vec<LocationSuggestion> = valid_entries(&response.data, "location")
        .map(|(_, entry)| LocationSuggestion::from(&entry.typed))
        .collect();
    suggestions.sort_by(|a, b| b.score.unwrap_or(0.0).total_cmp(&a.score.unwrap_or(0.0)));
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places_response::PlaceDetailsResponse;
    use crate::supplier::{HotelListResponse, HotelOffersResponse, TransferOffersResponse};
    use serde_json::json;
    use test_case::test_case;

    fn offers_payload() -> FlightSearchPayload {
        serde_json::from_value(json!({
            "data": [{
                "id": "1",
                "itineraries": [
                    {"duration": "PT2H10M", "segments": [{
                        "departure": {"iataCode": "DEL", "terminal": "3", "at": "2025-06-01T06:00:00"},
                        "arrival": {"iataCode": "BOM", "at": "2025-06-01T08:10:00"},
                        "carrierCode": "AI", "number": "865", "duration": "PT2H10M", "numberOfStops": 0
                    }]},
                    {"duration": "PT2H05M", "segments": [{
                        "departure": {"iataCode": "BOM", "at": "2025-06-05T19:00:00"},
                        "arrival": {"iataCode": "DEL", "at": "2025-06-05T21:05:00"},
                        "carrierCode": "AI", "number": "866", "numberOfStops": 0
                    }]}
                ],
                "price": {"total": "10850.00", "currency": "INR"},
                "validatingAirlineCodes": ["AI"]
            }, {
                "id": "2",
                "itineraries": [{"segments": [{
                    "departure": {"iataCode": "DEL", "at": "2025-06-01T09:00:00"},
                    "arrival": {"iataCode": "BOM", "at": "2025-06-01T11:15:00"},
                    "carrierCode": "6E", "number": "201"
                }]}]
            }, {
                "id": "3",
                "itineraries": "not a list"
            }],
            "dictionaries": {
                "carriers": {"AI": "AIR INDIA"},
                "locations": {
                    "DEL": {"cityCode": "DEL", "countryCode": "IN"},
                    "BOM": {"cityCode": "BOM", "countryCode": "IN"}
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_map_priced_offers() {
        let flights = map_offers_to_unified(&offers_payload(), "INR");
        assert_eq!(flights.len(), 2, "malformed offer should be skipped");

        let first = &flights[0];
        assert_eq!(first.price_total, "10850.00");
        assert_eq!(first.carrier_name.as_deref(), Some("AIR INDIA"));
        assert_eq!(first.origin.iata_code, "DEL");
        assert_eq!(first.origin.country.as_deref(), Some("IN"));
        assert_eq!(first.destination.iata_code, "BOM");
        assert_eq!(first.outbound().unwrap().segments[0].departure.iata_code, "DEL");
        assert_eq!(first.inbound().unwrap().segments[0].departure.iata_code, "BOM");
        assert_eq!(first.raw_offer["validatingAirlineCodes"][0], "AI");

        // Unpriced offer falls back to the sentinel and carrier code as name
        let second = &flights[1];
        assert_eq!(second.price_total, PRICE_NOT_AVAILABLE);
        assert_eq!(second.currency, "INR");
        assert_eq!(second.carrier_code.as_deref(), Some("6E"));
        assert_eq!(second.carrier_name.as_deref(), Some("6E"));
    }

    #[test]
    fn test_map_availability_offers() {
        let payload: FlightSearchPayload = serde_json::from_value(json!({
            "data": [{
                "id": "1",
                "duration": "PT4H30M",
                "segments": [
                    {"departure": {"iataCode": "DEL", "at": "2025-06-01T06:00:00"},
                     "arrival": {"iataCode": "AMD", "at": "2025-06-01T07:30:00"},
                     "carrierCode": "UK", "number": "951"},
                    {"departure": {"iataCode": "AMD", "at": "2025-06-01T09:00:00"},
                     "arrival": {"iataCode": "BOM", "at": "2025-06-01T10:30:00"},
                     "carrierCode": "UK", "number": "952"}
                ]
            }]
        }))
        .unwrap();

        let flights = map_offers_to_unified(&payload, "EUR");
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].price_total, PRICE_NOT_AVAILABLE);
        assert_eq!(flights[0].currency, "EUR");
        assert_eq!(flights[0].origin.iata_code, "DEL");
        assert_eq!(flights[0].destination.iata_code, "BOM");
        assert_eq!(flights[0].itineraries.len(), 1);
        assert_eq!(flights[0].itineraries[0].segments.len(), 2);
    }

    #[test_case(Some("2025-06-01"), Some("2025-06-04"), 3; "three nights")]
    #[test_case(Some("2025-06-01"), Some("2025-06-01"), 1; "same day")]
    #[test_case(Some("2025-06-05"), Some("2025-06-01"), 1; "reversed dates")]
    #[test_case(Some("2025-06-01T14:00:00"), Some("2025-06-02T11:00:00"), 1; "partial day")]
    #[test_case(Some("2025-06-01T10:00:00"), Some("2025-06-02T11:00:00"), 2; "partial day rounds up")]
    #[test_case(None, Some("2025-06-04"), 1; "missing check in")]
    #[test_case(Some("junk"), Some("2025-06-04"), 1; "unparseable")]
    fn test_nights_between(check_in: Option<&str>, check_out: Option<&str>, expected: u32) {
        assert_eq!(nights_between(check_in, check_out), expected);
    }

    fn hotel_offers(value: serde_json::Value) -> Vec<Lenient<HotelOfferData>> {
        serde_json::from_value::<HotelOffersResponse>(value).unwrap().data
    }

    #[test]
    fn test_map_hotel_offer_price_per_night() {
        let offers = hotel_offers(json!({"data": [{
            "hotel": {"hotelId": "HLPAR001", "name": "Le Marais", "cityCode": "PAR",
                      "rating": "4", "amenities": ["SWIMMING_POOL", "WIFI"],
                      "media": [{"uri": "https://img.example/1.jpg"}]},
            "offers": [{
                "checkInDate": "2025-06-01", "checkOutDate": "2025-06-04",
                "room": {"typeEstimated": {"category": "DELUXE_ROOM"},
                         "description": {"text": "Deluxe room, city view"}},
                "price": {"currency": "EUR", "total": "450.00"},
                "policies": {"cancellations": [{"deadline": "2025-05-30T23:59:00+02:00"}]}
            }]
        }]}));

        let meta = HotelMetaMap::new();
        let hotels = map_hotel_offers_response(&offers, &meta);
        assert_eq!(hotels.len(), 1);

        let hotel = &hotels[0];
        assert_eq!(hotel.nights, 3);
        assert_eq!(hotel.total_price, 450.0);
        assert_eq!(hotel.price_per_night, 150.0);
        assert_eq!(hotel.currency, "EUR");
        assert_eq!(hotel.stars, 4);
        assert_eq!(hotel.amenities, vec!["Swimming Pool", "Wifi"]);
        assert_eq!(hotel.image, "https://img.example/1.jpg");
        assert_eq!(hotel.room_types, vec!["Deluxe Room"]);
        assert_eq!(hotel.description, "Deluxe room, city view");
        assert_eq!(
            hotel.cancellation_policy.as_deref(),
            Some("Free cancellation until 2025-05-30T23:59:00+02:00")
        );
    }

    #[test]
    fn test_map_hotel_offer_missing_optional_fields() {
        let offers = hotel_offers(json!({"data": [{
            "hotel": {"hotelId": "HLDEL042"},
            "offers": [{"price": {"total": "99.5"}}]
        }]}));

        let first = map_hotel_offers_response(&offers, &HotelMetaMap::new());
        let second = map_hotel_offers_response(&offers, &HotelMetaMap::new());
        let hotel = &first[0];

        assert_eq!(hotel.rating, 0.0);
        assert_eq!(hotel.review_count, 0);
        assert_eq!(hotel.stars, 0);
        assert_eq!(hotel.nights, 1);
        assert_eq!(hotel.price_per_night, 99.5);
        assert_eq!(hotel.currency, DEFAULT_HOTEL_CURRENCY);
        assert_eq!(hotel.amenities, DEFAULT_AMENITIES.to_vec());
        assert_eq!(hotel.description, DEFAULT_HOTEL_DESCRIPTION);
        assert!(!hotel.image.is_empty());
        assert_eq!(hotel.image, second[0].image);
        assert_eq!(hotel.image, fallback_image("HLDEL042"));
        assert!(hotel.cancellation_policy.is_none());
    }

    #[test]
    fn test_hotel_meta_overrides_offer_fields() {
        let list: HotelListResponse = serde_json::from_value(json!({"data": [{
            "hotelId": "HLBOM007", "name": "Sea View Inn", "iataCode": "BOM",
            "geoCode": {"latitude": 19.07, "longitude": 72.87},
            "address": {"countryCode": "IN"}
        }]}))
        .unwrap();
        let list: Vec<HotelListItem> = list
            .data
            .iter()
            .filter_map(|e| e.valid())
            .map(|e| e.typed.clone())
            .collect();
        let meta = build_hotel_meta_map(&list);

        let offers = hotel_offers(json!({"data": [
            {"hotel": {"hotelId": "HLBOM007", "name": "SEA VIEW INN"},
             "offers": [{"price": {"total": "80", "currency": "INR"}}]},
            {"hotel": {"hotelId": "HLBOM008"}, "offers": []}
        ]}));
        let hotels = map_hotel_offers_response(&offers, &meta);

        assert_eq!(hotels.len(), 1, "hotel without offers is dropped");
        assert_eq!(hotels[0].name, "Sea View Inn");
        assert_eq!(hotels[0].city, "BOM");
        assert_eq!(hotels[0].country, "IN");
        assert_eq!(hotels[0].latitude, Some(19.07));
    }

    #[test]
    fn test_fallback_image_is_deterministic() {
        let ids = ["HLPAR001", "HLPAR002", "HLDEL042", ""];
        for id in ids {
            assert_eq!(fallback_image(id), fallback_image(id));
            assert!(FALLBACK_IMAGES.contains(&fallback_image(id)));
        }
    }

    #[test_case("SWIMMING_POOL", "Swimming Pool")]
    #[test_case("wifi", "Wifi")]
    #[test_case("AIR CONDITIONING", "Air Conditioning")]
    #[test_case("", "")]
    fn test_title_case(input: &str, expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[test]
    fn test_place_details_enrichment() {
        let response: PlaceDetailsResponse = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "rating": 4.4,
                "user_ratings_total": 1280,
                "formatted_address": "12 Rue de Bretagne, 75003 Paris, France",
                "geometry": {"location": {"lat": 48.86, "lng": 2.36}},
                "photos": [
                    {"photo_reference": "p1"}, {"photo_reference": "p2"},
                    {"photo_reference": "p3"}, {"photo_reference": "p4"}
                ],
                "reviews": (0..7).map(|i| json!({
                    "author_name": format!("guest {}", i), "rating": 5, "text": "great",
                    "relative_time_description": "a week ago"
                })).collect::<Vec<_>>(),
                "website": "https://lemarais.example"
            }
        }))
        .unwrap();

        let enrichment = map_place_details_to_hotel(&response.result.unwrap());
        assert_eq!(enrichment.rating, 4.4);
        assert_eq!(enrichment.review_count, 1280);
        assert_eq!(enrichment.images.len(), 4);
        assert_eq!(enrichment.thumbnail_images.len(), 3);
        assert_eq!(enrichment.reviews.len(), 5);
        assert_eq!(enrichment.short_address, "12 Rue de Bretagne");
        assert_eq!(enrichment.images[0], "/api/places/photo?ref=p1&maxWidth=400");
        assert!(enrichment.images.iter().all(|url| !url.contains("key=")));

        let offers = hotel_offers(json!({"data": [{
            "hotel": {"hotelId": "HLPAR001"},
            "offers": [{"price": {"total": "100"}}]
        }]}));
        let mut hotel = map_hotel_offers_response(&offers, &HotelMetaMap::new()).remove(0);
        apply_place_enrichment(&mut hotel, enrichment);

        assert_eq!(hotel.rating, 4.4);
        assert_eq!(hotel.review_count, 1280);
        assert_eq!(hotel.image, "/api/places/photo?ref=p1&maxWidth=400");
        assert_eq!(hotel.latitude, Some(48.86));
        assert_eq!(hotel.booking_link.as_deref(), Some("https://lemarais.example"));
    }

    #[test]
    fn test_empty_place_details() {
        let enrichment = map_place_details_to_hotel(&PlaceDetails::default());
        assert_eq!(enrichment, PlaceEnrichment::default());
    }

    #[test_case("PT2H10M", Some(130))]
    #[test_case("PT45M", Some(45))]
    #[test_case("PT1H", Some(60))]
    #[test_case("PT30S", Some(0))]
    #[test_case("P1D", None)]
    fn test_parse_duration_minutes(input: &str, expected: Option<u32>) {
        assert_eq!(parse_duration_minutes(input), expected);
    }

    #[test]
    fn test_map_transfer_offers() {
        let response: TransferOffersResponse = serde_json::from_value(json!({"data": [
            {
                "id": "T1",
                "transferType": "PRIVATE",
                "vehicle": {"code": "CAR", "category": "BU", "description": "Mercedes E-Class",
                            "imageURL": "https://img.example/car.png",
                            "seats": [{"count": 3}], "baggages": [{"count": 2}]},
                "serviceProvider": {"code": "ABC", "name": "City Cars", "logoUrl": "https://img.example/logo.png"},
                "quotation": {"monetaryAmount": "63.70", "currencyCode": "EUR"},
                "cancellationRules": [{"feeType": "PERCENTAGE", "feeValue": "100"}],
                "duration": "PT50M",
                "distance": {"value": 34.5, "unit": "KM"}
            },
            {
                "vehicle": {"code": "VAN"},
                "quotation": {"monetaryAmount": "90", "currencyCode": "EUR"}
            },
            {"quotation": {}}
        ]}))
        .unwrap();

        let vehicles = map_transfer_offers_response(&response.data);
        assert_eq!(vehicles.len(), 2);

        assert_eq!(vehicles[0].id, "T1");
        assert_eq!(vehicles[0].category_label, "Business");
        assert_eq!(vehicles[0].seats, 3);
        assert_eq!(vehicles[0].bags, 2);
        assert_eq!(vehicles[0].price, 63.70);
        assert_eq!(vehicles[0].duration_minutes, Some(50));
        assert_eq!(vehicles[0].provider.name, "City Cars");
        assert_eq!(vehicles[0].cancellation_rules.len(), 1);

        assert_eq!(vehicles[1].id, "transfer-1");
        assert_eq!(vehicles[1].category, "ST");
        assert_eq!(vehicles[1].category_label, "Standard");
        assert_eq!(vehicles[1].name, "VAN");
        assert_eq!(vehicles[1].transfer_type, "PRIVATE");
    }

    #[test]
    fn test_map_location_response() {
        let response: LocationSearchResponse = serde_json::from_value(json!({"data": [
            {"subType": "AIRPORT", "name": "INDIRA GANDHI INTL", "iataCode": "DEL",
             "address": {"cityName": "DELHI", "countryCode": "IN", "countryName": "INDIA"},
             "analytics": {"travelers": {"score": 27}}},
            {"subType": "CITY", "name": "DELHI", "iataCode": "DEL", "address": {"countryCode": "IN"},
             "analytics": {"travelers": {}}},
            {"subType": "AIRPORT", "name": "NO CODE"},
            {"subType": "AIRPORT", "name": "SAFDARJUNG", "iataCode": "VIDD",
             "analytics": {"travelers": {"score": 31}}}
        ]}))
        .unwrap();

        let suggestions = map_location_response(&response);
        let names: Vec<&str> = suggestions.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["SAFDARJUNG", "INDIRA GANDHI INTL", "DELHI"]);
        assert_eq!(suggestions[1].city_name, "DELHI");
        assert_eq!(suggestions[1].score, Some(27.0));
        assert_eq!(suggestions[2].city_name, "");
        assert_eq!(suggestions[2].score, None);
    }
}
