// Places API JSON shapes (find-place and place-details)

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FindPlaceResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub candidates: Vec<PlaceCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceCandidate {
    pub place_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceDetails {
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
    #[serde(default)]
    pub photos: Vec<PlacePhoto>,
    #[serde(default)]
    pub reviews: Vec<PlaceReview>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub geometry: Option<PlaceGeometry>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlacePhoto {
    pub photo_reference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceReview {
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub relative_time_description: Option<String>,
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceGeometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}
