// HTTP wrapper for the GDS-style provider
// Attaches the bearer token to every call and turns non-2xx responses into ApiError::Upstream.

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::auth::TokenProvider;
use crate::error::ApiError;

pub type QueryParams<'a> = [(&'a str, Option<String>)];

#[derive(Clone)]
pub struct ProviderClient {
    base_url: String,
    http: reqwest::Client,
    tokens: Arc<dyn TokenProvider>,
}

impl ProviderClient {
    pub fn new(
        base_url: impl Into<String>,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            tokens,
        }
    }

    // Absent or empty parameters are left out of the query string
    pub fn build_url(
        &self,
        path: &str,
        params: &QueryParams<'_>,
    ) -> Result<reqwest::Url, ApiError> {
        let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::Config(format!("invalid provider url for {}: {}", path, e)))?;

        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                    pairs.append_pair(key, value);
                }
            }
        }
        // An empty serializer still leaves a trailing '?'
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &QueryParams<'_>,
    ) -> Result<T, ApiError> {
        let url = self.build_url(path, params)?;
        tracing::debug!(%url, "GET provider");
        let request = self.http.get(url);
        self.send(request).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.build_url(path, &[])?;
        tracing::debug!(%url, "POST provider");
        let mut request = self.http.post(url).json(body);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let token = self.tokens.token().await?;
        let response = request.bearer_auth(token).send().await?;
        let response = ensure_success(response).await?;

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

pub async fn ensure_success(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Upstream {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("").to_string(),
        body,
    })
}
