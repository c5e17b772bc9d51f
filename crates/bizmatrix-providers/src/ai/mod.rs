//! AI provider adapter backed by the Gemini `generateContent` API with maps
//! grounding.
//!
//! The model is asked for a raw JSON array of businesses. The answer is
//! fence-stripped, parsed, and normalized into [`BusinessRecord`]s tagged
//! [`SourceTag::Ai`](bizmatrix_core::SourceTag::Ai).

pub mod prompt;

mod parse;
mod types;

use std::time::Duration;

use bizmatrix_core::{AiSource, AppConfig, BusinessRecord, GeoPoint, SearchQuery};
use reqwest::{Client, Url};

use crate::error::ProviderError;
use parse::{parse_businesses, PROVIDER};
use types::{
    ApiErrorEnvelope, Content, GenerateContentRequest, GenerateContentResponse, GoogleMaps, LatLng,
    Part, RetrievalConfig, Tool, ToolConfig,
};

pub use types::AiBusiness;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_USER_AGENT: &str = "bizmatrix/0.1 (business-lookup)";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini `generateContent` endpoint.
///
/// Use [`GeminiClient::new`] for production, [`GeminiClient::from_app_config`]
/// from the server, or [`GeminiClient::with_base_url`] to point at a mock
/// server in tests.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: Url,
}

impl GeminiClient {
    /// Creates a client for the production API and default model.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ProviderError> {
        Self::with_base_url(
            api_key,
            DEFAULT_MODEL,
            timeout_secs,
            DEFAULT_BASE_URL,
            DEFAULT_USER_AGENT,
        )
    }

    /// Creates a client from the loaded application config.
    ///
    /// # Errors
    ///
    /// See [`GeminiClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ProviderError> {
        Self::with_base_url(
            &config.gemini_api_key,
            &config.gemini_model,
            config.provider_timeout_secs,
            &config.gemini_base_url,
            &config.user_agent,
        )
    }

    /// Creates a client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`ProviderError::InvalidBaseUrl`] if `base_url` does not
    /// parse as an absolute URL.
    pub fn with_base_url(
        api_key: &str,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
        user_agent: &str,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let endpoint = build_endpoint(base_url, model)?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            endpoint,
        })
    }

    /// The fully-qualified `generateContent` URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the model for businesses matching `query`, excluding `exclude`.
    ///
    /// When `location` is present it is passed as a grounding hint; the
    /// textual location in the prompt is still authoritative.
    ///
    /// # Errors
    ///
    /// - [`ProviderError::Http`] on network failure.
    /// - [`ProviderError::Api`] on a non-2xx status.
    /// - [`ProviderError::EmptyResponse`] if the model returns no text.
    /// - [`ProviderError::Deserialize`] if the text is not the expected
    ///   JSON array.
    pub async fn search(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
        exclude: &[String],
    ) -> Result<Vec<BusinessRecord>, ProviderError> {
        let prompt = prompt::build_prompt(query, exclude);
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: &prompt }],
            }],
            tools: vec![Tool {
                google_maps: GoogleMaps {},
            }],
            tool_config: location.map(|point| ToolConfig {
                retrieval_config: RetrievalConfig {
                    lat_lng: LatLng {
                        latitude: point.latitude,
                        longitude: point.longitude,
                    },
                },
            }),
        };

        tracing::debug!(
            category = %query.category,
            excluded = exclude.len(),
            has_location = location.is_some(),
            "requesting businesses from AI provider"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let description = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: status.as_u16(),
                description,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Deserialize {
                context: "generateContent response".to_string(),
                source: e,
            })?;

        let text = parsed
            .first_candidate_text()
            .ok_or(ProviderError::EmptyResponse { provider: PROVIDER })?;

        let records = parse_businesses(&text)?;
        tracing::debug!(count = records.len(), "AI provider returned businesses");
        Ok(records)
    }
}

impl AiSource for GeminiClient {
    type Error = ProviderError;

    async fn find_businesses(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
        exclude: &[String],
    ) -> Result<Vec<BusinessRecord>, ProviderError> {
        self.search(query, location, exclude).await
    }
}

fn build_endpoint(base_url: &str, model: &str) -> Result<Url, ProviderError> {
    let invalid = |reason: String| ProviderError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let method = format!("{model}:generateContent");
    let mut url = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .extend(["v1beta", "models", method.as_str()]);
    Ok(url)
}
