// Airport and city keyword search

use crate::error::ApiError;
use crate::http_client::ProviderClient;
use crate::supplier::LocationSearchResponse;

pub const LOCATIONS_PATH: &str = "/v1/reference-data/locations";

const PAGE_LIMIT: &str = "10";

pub struct LocationService {
    client: ProviderClient,
}

impl LocationService {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    // Airport and city autocomplete, most travelled first
    pub async fn search(&self, keyword: &str) -> Result<LocationSearchResponse, ApiError> {
        self.client
            .get(
                LOCATIONS_PATH,
                &[
                    ("subType", Some("AIRPORT,CITY".to_string())),
                    ("keyword", Some(keyword.trim().to_uppercase())),
                    ("page[limit]", Some(PAGE_LIMIT.to_string())),
                    ("sort", Some("analytics.travelers.score".to_string())),
                ],
            )
            .await
    }
}
