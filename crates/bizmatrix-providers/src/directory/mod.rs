//! Directory provider adapter backed by the Yelp Fusion `businesses/search`
//! endpoint.
//!
//! The directory cannot exclude names, so continuation rounds may see the same
//! top listings again. The session's round filter removes repeats.

pub mod normalize;
pub mod params;
pub mod types;

use std::time::Duration;

use bizmatrix_core::{AppConfig, BusinessRecord, DirectorySource, GeoPoint, SearchQuery};
use reqwest::header::ACCEPT;
use reqwest::{Client, Url};

use crate::error::ProviderError;
use types::{YelpErrorBody, YelpSearchResponse};

const DEFAULT_BASE_URL: &str = "https://api.yelp.com";
const DEFAULT_USER_AGENT: &str = "bizmatrix/0.1 (business-lookup)";
const PROVIDER: &str = "Directory";

/// Client for the directory search API.
pub struct YelpClient {
    client: Client,
    api_key: String,
    search_url: Url,
}

impl YelpClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL, DEFAULT_USER_AGENT)
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// See [`YelpClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(
            &config.yelp_api_key,
            config.provider_timeout_secs,
            &config.yelp_base_url,
            &config.user_agent,
        )
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidBaseUrl`] if `base_url` is not a
    /// valid absolute URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Ensure exactly one trailing slash so `join` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let search_url = Url::parse(&normalised)
            .and_then(|base| base.join("v3/businesses/search"))
            .map_err(|e| ProviderError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            search_url,
        })
    }

    /// Searches the directory and returns listings rated at least
    /// `query.min_rating`.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::LocationRequired`] without location text or
    ///   coordinates. No request is sent.
    /// - [`ProviderError::Http`] on network failure.
    /// - [`ProviderError::Api`] on a non-2xx status, carrying the provider's
    ///   error description and code when present.
    /// - [`ProviderError::Deserialize`] if a listing lacks a required field.
    pub async fn search(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
    ) -> Result<Vec<BusinessRecord>, ProviderError> {
        let params = params::build_search_params(query, location)?;
        let url = self.build_url(&params);

        tracing::debug!(
            category = %query.category,
            has_location_text = query.location_text().is_some(),
            "requesting businesses from directory provider"
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let description = serde_json::from_str::<YelpErrorBody>(&body)
                .ok()
                .and_then(YelpErrorBody::into_description)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                description,
            });
        }

        let parsed: YelpSearchResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "businesses/search response".to_string(),
                source: e,
            })?;

        let listings = parsed.businesses.unwrap_or_default();
        let fetched = listings.len();
        let records = normalize::normalize_listings(listings, query.min_rating);
        tracing::debug!(
            fetched,
            kept = records.len(),
            "directory provider returned businesses"
        );
        Ok(records)
    }

    fn build_url(&self, params: &[(&str, String)]) -> Url {
        let mut url = self.search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
        }
        url
    }
}

impl DirectorySource for YelpClient {
    type Error = ProviderError;

    async fn find_businesses(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
    ) -> Result<Vec<BusinessRecord>, ProviderError> {
        self.search(query, location).await
    }
}
