// Request validation for the HTTP routes
// Bodies are deserialized leniently (every field optional) and checked here,
// so a bad request is rejected before any provider call is made.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::error::RouteError;
use crate::filters::HotelFilter;
use crate::services::{FlightSearchParams, HotelSearchParams, StayParams};
use crate::supplier::TransferSearchRequest;

pub const MAX_ADULTS: u32 = 9;
pub const MAX_RESULTS: u32 = 250;
pub const MAX_GUESTS: u32 = 10;
pub const MAX_ROOMS: u32 = 5;
pub const DEFAULT_PHOTO_WIDTH: u32 = 400;
pub const MAX_PHOTO_WIDTH: u32 = 1600;
pub const MIN_KEYWORD_LEN: usize = 3;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightSearchBody {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub departure_date: Option<String>,
    pub return_date: Option<String>,
    pub adults: Option<i64>,
    pub max: Option<i64>,
    pub currency_code: Option<String>,
    pub non_stop: Option<bool>,
    pub trip_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlightPriceBody {
    pub flight_offer: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotelSearchBody {
    pub city_code: Option<String>,
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub guests: Option<i64>,
    pub rooms: Option<i64>,
    pub currency: Option<String>,
    pub filters: HotelFilter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotelDetailQuery {
    pub check_in: Option<String>,
    pub check_out: Option<String>,
    pub adults: Option<i64>,
    pub rooms: Option<i64>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferSearchBody {
    pub start_location_code: Option<String>,
    pub end_address_line: Option<String>,
    pub end_city_name: Option<String>,
    pub end_zip_code: Option<String>,
    pub end_country_code: Option<String>,
    pub end_name: Option<String>,
    pub end_geo_code: Option<String>,
    pub transfer_type: Option<String>,
    pub start_date_time: Option<String>,
    pub passengers: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RatesQuery {
    pub base: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoQuery {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
    pub max_width: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoRequest {
    pub reference: String,
    pub max_width: u32,
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, RouteError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RouteError::validation(format!("{} is required", field)))
}

fn iata_code(value: &Option<String>, field: &str) -> Result<String, RouteError> {
    let code = required(value, field)?;
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RouteError::validation(format!(
            "{} must be a 3-letter IATA code",
            field
        )));
    }
    Ok(code.to_ascii_uppercase())
}

fn iso_date(value: &Option<String>, field: &str) -> Result<NaiveDate, RouteError> {
    let raw = required(value, field)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| RouteError::validation(format!("{} must be an ISO date (YYYY-MM-DD)", field)))
}

fn bounded(
    value: Option<i64>,
    default: u32,
    min: u32,
    max: u32,
    field: &str,
) -> Result<u32, RouteError> {
    let Some(value) = value else {
        return Ok(default);
    };
    if value < i64::from(min) || value > i64::from(max) {
        return Err(RouteError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(value as u32)
}

fn optional_trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn validate_flight_search(
    body: &FlightSearchBody,
    default_max: u32,
) -> Result<FlightSearchParams, RouteError> {
    let origin = iata_code(&body.origin, "origin")?;
    let destination = iata_code(&body.destination, "destination")?;
    if origin == destination {
        return Err(RouteError::validation("origin and destination must differ"));
    }

    let departure_date = iso_date(&body.departure_date, "departureDate")?;
    let one_way = body.trip_type.as_deref() == Some("one-way");
    let return_date = match optional_trimmed(&body.return_date) {
        Some(_) if one_way => None,
        Some(_) => Some(iso_date(&body.return_date, "returnDate")?),
        None => None,
    };
    if return_date.is_some_and(|r| r < departure_date) {
        return Err(RouteError::validation("returnDate cannot be before departureDate"));
    }

    Ok(FlightSearchParams {
        origin,
        destination,
        departure_date,
        return_date,
        adults: bounded(body.adults, 1, 1, MAX_ADULTS, "adults")?,
        max: bounded(body.max, default_max.clamp(1, MAX_RESULTS), 1, MAX_RESULTS, "max")?,
        currency_code: optional_trimmed(&body.currency_code).map(|c| c.to_ascii_uppercase()),
        non_stop: body.non_stop.unwrap_or(false),
    })
}

pub fn validate_flight_price(body: &FlightPriceBody) -> Result<Value, RouteError> {
    match &body.flight_offer {
        Some(offer @ Value::Object(_)) => Ok(offer.clone()),
        Some(_) => Err(RouteError::validation("flightOffer must be an object")),
        None => Err(RouteError::validation("flightOffer is required in request body")),
    }
}

fn stay_dates(
    check_in: &Option<String>,
    check_out: &Option<String>,
) -> Result<(NaiveDate, NaiveDate), RouteError> {
    let check_in = iso_date(check_in, "checkIn")?;
    let check_out = iso_date(check_out, "checkOut")?;
    if check_in >= check_out {
        return Err(RouteError::validation("checkIn must be before checkOut"));
    }
    Ok((check_in, check_out))
}

pub fn validate_hotel_search(body: &HotelSearchBody) -> Result<HotelSearchParams, RouteError> {
    let city_code = iata_code(&body.city_code, "cityCode")?;
    let (check_in, check_out) = stay_dates(&body.check_in, &body.check_out)?;

    Ok(HotelSearchParams {
        city_code,
        stay: StayParams {
            check_in,
            check_out,
            adults: bounded(body.guests, 1, 1, MAX_GUESTS, "guests")?,
            rooms: bounded(body.rooms, 1, 1, MAX_ROOMS, "rooms")?,
            currency: optional_trimmed(&body.currency).map(|c| c.to_ascii_uppercase()),
        },
    })
}

pub fn validate_hotel_detail(
    hotel_id: &str,
    query: &HotelDetailQuery,
) -> Result<StayParams, RouteError> {
    let hotel_id = hotel_id.trim();
    let well_formed = !hotel_id.is_empty()
        && hotel_id.len() <= 16
        && hotel_id.chars().all(|c| c.is_ascii_alphanumeric());
    if !well_formed {
        return Err(RouteError::validation("hotelId must be alphanumeric"));
    }
    if query.check_in.is_none() || query.check_out.is_none() {
        return Err(RouteError::validation(
            "Missing required parameters: checkIn, checkOut",
        ));
    }
    let (check_in, check_out) = stay_dates(&query.check_in, &query.check_out)?;

    Ok(StayParams {
        check_in,
        check_out,
        adults: bounded(query.adults, 1, 1, MAX_GUESTS, "adults")?,
        rooms: bounded(query.rooms, 1, 1, MAX_ROOMS, "rooms")?,
        currency: optional_trimmed(&query.currency).map(|c| c.to_ascii_uppercase()),
    })
}

pub fn validate_transfer_search(
    body: &TransferSearchBody,
) -> Result<TransferSearchRequest, RouteError> {
    let missing: Vec<&str> = [
        ("startLocationCode", &body.start_location_code),
        ("endGeoCode", &body.end_geo_code),
        ("startDateTime", &body.start_date_time),
    ]
    .iter()
    .filter(|(_, value)| optional_trimmed(value).is_none())
    .map(|(name, _)| *name)
    .collect();
    if !missing.is_empty() {
        return Err(RouteError::validation(format!(
            "Missing required parameters: {}",
            missing.join(", ")
        )));
    }

    let passengers = match body.passengers {
        Some(n) if n < 1 => return Err(RouteError::validation("passengers must be at least 1")),
        Some(n) => u32::try_from(n).map_err(|_| RouteError::validation("passengers is too large"))?,
        None => 1,
    };

    let text = |value: &Option<String>| optional_trimmed(value).unwrap_or_default();
    Ok(TransferSearchRequest {
        start_location_code: text(&body.start_location_code).to_ascii_uppercase(),
        end_address_line: text(&body.end_address_line),
        end_city_name: text(&body.end_city_name),
        end_zip_code: text(&body.end_zip_code),
        end_country_code: text(&body.end_country_code),
        end_name: text(&body.end_name),
        end_geo_code: text(&body.end_geo_code),
        transfer_type: optional_trimmed(&body.transfer_type)
            .map(|t| t.to_ascii_uppercase())
            .unwrap_or_else(|| "PRIVATE".to_string()),
        start_date_time: text(&body.start_date_time),
        passengers,
    })
}

// Short keywords get an empty result instead of a provider call
pub fn location_keyword(query: &LocationQuery) -> Option<String> {
    optional_trimmed(&query.keyword).filter(|k| k.chars().count() >= MIN_KEYWORD_LEN)
}

pub fn validate_photo(query: &PhotoQuery) -> Result<PhotoRequest, RouteError> {
    let reference = optional_trimmed(&query.reference)
        .ok_or_else(|| RouteError::validation("Missing photo reference"))?;
    Ok(PhotoRequest {
        reference,
        max_width: bounded(query.max_width, DEFAULT_PHOTO_WIDTH, 1, MAX_PHOTO_WIDTH, "maxWidth")?,
    })
}
