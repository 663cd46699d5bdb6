// Server-side hotel filtering and ordering applied after enrichment

use serde::Deserialize;
use std::cmp::Ordering;

use crate::unified::UnifiedHotel;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Recommended,
    PriceAsc,
    PriceDesc,
    RatingDesc,
    StarsDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HotelFilter {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_stars: Option<u8>,
    // Every listed amenity must be present (case-insensitive)
    pub amenities: Vec<String>,
    pub sort: SortOrder,
}

impl HotelFilter {
    pub fn matches(&self, hotel: &UnifiedHotel) -> bool {
        if !self.min_price.map_or(true, |min| hotel.price_per_night >= min) {
            return false;
        }

        if !self.max_price.map_or(true, |max| hotel.price_per_night <= max) {
            return false;
        }

        if !self.min_stars.map_or(true, |stars| hotel.stars >= stars) {
            return false;
        }

        self.amenities.iter().all(|wanted| {
            hotel
                .amenities
                .iter()
                .any(|have| have.eq_ignore_ascii_case(wanted.trim()))
        })
    }

    // Filters in place, then orders. Recommended keeps provider order.
    pub fn apply(&self, hotels: Vec<UnifiedHotel>) -> Vec<UnifiedHotel> {
        let mut filtered: Vec<UnifiedHotel> =
            hotels.into_iter().filter(|h| self.matches(h)).collect();

        match self.sort {
            SortOrder::Recommended => {}
            SortOrder::PriceAsc => {
                filtered.sort_by(|a, b| by_f64(a.price_per_night, b.price_per_night))
            }
            SortOrder::PriceDesc => {
                filtered.sort_by(|a, b| by_f64(b.price_per_night, a.price_per_night))
            }
            SortOrder::RatingDesc => filtered.sort_by(|a, b| by_f64(b.rating, a.rating)),
            SortOrder::StarsDesc => filtered.sort_by(|a, b| b.stars.cmp(&a.stars)),
        }

        filtered
    }
}

fn by_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
