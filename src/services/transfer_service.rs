// Ground transfer offers between an airport and an address

use tracing::debug;

use crate::error::ApiError;
use crate::http_client::ProviderClient;
use crate::supplier::{TransferOffersResponse, TransferSearchRequest};

pub const TRANSFER_OFFERS_PATH: &str = "/v1/shopping/transfer-offers";

pub struct TransferService {
    client: ProviderClient,
}

impl TransferService {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    pub async fn search(
        &self,
        request: &TransferSearchRequest,
    ) -> Result<TransferOffersResponse, ApiError> {
        debug!(
            start = %request.start_location_code,
            transfer_type = %request.transfer_type,
            passengers = request.passengers,
            "Searching transfer offers"
        );
        self.client.post(TRANSFER_OFFERS_PATH, request, &[]).await
    }
}
