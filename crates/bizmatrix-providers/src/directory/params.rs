//! Query-string construction for the directory search endpoint.

use bizmatrix_core::{GeoPoint, SearchQuery};

use crate::error::ProviderError;

/// Metres per statute mile.
const METERS_PER_MILE: f64 = 1609.34;

/// The directory rejects radii above this many metres.
pub const MAX_RADIUS_METERS: u32 = 40_000;

/// Listings requested per call.
pub const RESULT_LIMIT: &str = "20";

/// Converts `miles` to whole metres, clamped to [`MAX_RADIUS_METERS`].
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn radius_meters(miles: f64) -> u32 {
    let meters = (miles * METERS_PER_MILE).round();
    if meters >= f64::from(MAX_RADIUS_METERS) {
        MAX_RADIUS_METERS
    } else if meters <= 0.0 {
        0
    } else {
        // Bounded above, so the cast cannot overflow.
        meters as u32
    }
}

/// Joins category, niche, and keywords with spaces, skipping blanks.
#[must_use]
pub fn search_term(query: &SearchQuery) -> String {
    [&query.category, &query.niche, &query.keywords]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the ordered query parameters for one search.
///
/// Location text wins over coordinates. The minimum rating is not sent; it is
/// applied to the response instead.
///
/// # Errors
///
/// Returns [`ProviderError::LocationRequired`] when the query has no location
/// text and no coordinates were supplied.
pub fn build_search_params(
    query: &SearchQuery,
    location: Option<GeoPoint>,
) -> Result<Vec<(&'static str, String)>, ProviderError> {
    let mut params = vec![("term", search_term(query))];

    match (query.location_text(), location) {
        (Some(text), _) => params.push(("location", text.to_string())),
        (None, Some(point)) => {
            params.push(("latitude", point.latitude.to_string()));
            params.push(("longitude", point.longitude.to_string()));
        }
        (None, None) => return Err(ProviderError::LocationRequired),
    }

    params.push(("radius", radius_meters(query.radius).to_string()));

    if let Some(code) = query.price_tier.directory_code() {
        params.push(("price", code.to_string()));
    }

    params.push(("limit", RESULT_LIMIT.to_string()));
    params.push(("sort_by", "best_match".to_string()));

    Ok(params)
}
