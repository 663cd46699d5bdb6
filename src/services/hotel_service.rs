// Hotel search: city hotel list, then offers for those hotels

use chrono::NaiveDate;
use tracing::debug;

use crate::config::HotelConfig;
use crate::error::ApiError;
use crate::http_client::ProviderClient;
use crate::mappers::{build_hotel_meta_map, HotelMetaMap};
use crate::supplier::{
    HotelListItem, HotelListResponse, HotelOfferData, HotelOffersResponse, Lenient,
};

pub const HOTELS_BY_CITY_PATH: &str = "/v1/reference-data/locations/hotels/by-city";
pub const HOTEL_OFFERS_PATH: &str = "/v3/shopping/hotel-offers";

#[derive(Debug, Clone, PartialEq)]
pub struct StayParams {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub rooms: u32,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelSearchParams {
    pub city_code: String,
    pub stay: StayParams,
}

// Raw offers plus the name/location metadata from the city listing
#[derive(Debug, Default)]
pub struct HotelSearchResult {
    pub offers: Vec<Lenient<HotelOfferData>>,
    pub meta: HotelMetaMap,
}

pub struct HotelService {
    client: ProviderClient,
    config: HotelConfig,
}

// The provider answers 404 when a city or hotel has nothing to offer
fn empty_on_not_found<T: Default>(result: Result<T, ApiError>) -> Result<T, ApiError> {
    match result {
        Err(ApiError::Upstream { status: 404, .. }) => Ok(T::default()),
        other => other,
    }
}

impl HotelService {
    pub fn new(client: ProviderClient, config: HotelConfig) -> Self {
        Self { client, config }
    }

    pub async fn list_by_city(&self, city_code: &str) -> Result<Vec<HotelListItem>, ApiError> {
        let response: HotelListResponse = empty_on_not_found(
            self.client
                .get(HOTELS_BY_CITY_PATH, &[("cityCode", Some(city_code.to_string()))])
                .await,
        )?;

        let total = response.data.len();
        let hotels: Vec<HotelListItem> = response
            .data
            .iter()
            .filter_map(Lenient::valid)
            .map(|entry| entry.typed.clone())
            .collect();
        debug!(city_code, total, usable = hotels.len(), "Listed hotels by city");
        Ok(hotels)
    }

    pub async fn offers(
        &self,
        hotel_ids: &[String],
        stay: &StayParams,
    ) -> Result<Vec<Lenient<HotelOfferData>>, ApiError> {
        if hotel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = hotel_ids
            .iter()
            .take(self.config.max_hotel_ids)
            .cloned()
            .collect::<Vec<_>>()
            .join(",");

        let response: HotelOffersResponse =
            empty_on_not_found(self.client.get(HOTEL_OFFERS_PATH, &offers_query(ids, stay)).await)?;
        Ok(response.data)
    }

    pub async fn search(&self, params: &HotelSearchParams) -> Result<HotelSearchResult, ApiError> {
        let hotels = self.list_by_city(&params.city_code).await?;
        if hotels.is_empty() {
            return Ok(HotelSearchResult::default());
        }

        let ids: Vec<String> = hotels.iter().map(|h| h.hotel_id.clone()).collect();
        let offers = self.offers(&ids, &params.stay).await?;

        Ok(HotelSearchResult {
            offers,
            meta: build_hotel_meta_map(&hotels),
        })
    }

    pub async fn hotel_offer(
        &self,
        hotel_id: &str,
        stay: &StayParams,
    ) -> Result<Vec<Lenient<HotelOfferData>>, ApiError> {
        self.offers(&[hotel_id.to_string()], stay).await
    }
}

fn offers_query(hotel_ids: String, stay: &StayParams) -> Vec<(&'static str, Option<String>)> {
    vec![
        ("hotelIds", Some(hotel_ids)),
        ("adults", Some(stay.adults.to_string())),
        ("checkInDate", Some(stay.check_in.format("%Y-%m-%d").to_string())),
        ("checkOutDate", Some(stay.check_out.format("%Y-%m-%d").to_string())),
        ("roomQuantity", Some(stay.rooms.to_string())),
        ("currency", stay.currency.clone()),
    ]
}
