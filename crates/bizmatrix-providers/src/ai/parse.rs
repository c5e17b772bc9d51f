//! Turns the model's free-text answer into normalized records.

use std::sync::LazyLock;

use bizmatrix_core::{BusinessRecord, SourceTag};
use regex::Regex;

use super::prompt::MAX_SERVICES;
use super::types::AiBusiness;
use crate::error::ProviderError;

pub(crate) const PROVIDER: &str = "AI";

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^```(?:[A-Za-z0-9_-]+)?\s*\n?(.*?)\n?\s*```$").expect("valid regex")
});

/// Removes a surrounding markdown code fence, if the whole text is fenced.
pub(crate) fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    CODE_FENCE
        .captures(trimmed)
        .and_then(|cap| cap.get(1))
        .map_or(trimmed, |m| m.as_str().trim())
}

/// Parses the model output into records tagged [`SourceTag::Ai`].
///
/// # Errors
///
/// - [`ProviderError::EmptyResponse`] when the text is blank.
/// - [`ProviderError::Deserialize`] when it is not a JSON array of
///   business objects carrying every required key.
pub(crate) fn parse_businesses(text: &str) -> Result<Vec<BusinessRecord>, ProviderError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(ProviderError::EmptyResponse { provider: PROVIDER });
    }

    let businesses: Vec<AiBusiness> =
        serde_json::from_str(body).map_err(|e| ProviderError::Deserialize {
            context: "AI business list".to_string(),
            source: e,
        })?;

    Ok(businesses.into_iter().map(normalize).collect())
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize(business: AiBusiness) -> BusinessRecord {
    let mut services = business.services_or_products;
    services.truncate(MAX_SERVICES);

    BusinessRecord {
        name: business.name,
        category: business.category,
        services_or_products: services,
        phone: business.phone,
        email: business.email,
        address: business.address,
        map_url: non_blank(&business.map_url),
        web_or_social_url: non_blank(&business.web_or_social_url),
        directory_url: None,
        source: SourceTag::Ai,
    }
}
