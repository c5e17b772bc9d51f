//! Natural-language task description sent to the AI provider.

use bizmatrix_core::SearchQuery;

/// Candidates requested per call. There is no pagination token; later rounds
/// rely on the exclusion list instead.
pub const REQUESTED_RESULTS: usize = 20;

/// Most services or products kept per business.
pub const MAX_SERVICES: usize = 4;

/// Builds the task description for `query`.
///
/// When `exclude` is non-empty the prompt lists every excluded name verbatim
/// and forbids returning any of them.
#[must_use]
pub fn build_prompt(query: &SearchQuery, exclude: &[String]) -> String {
    let location = query
        .location_text()
        .unwrap_or("the user's current location");

    let niche = match query.niche.trim() {
        "" => "any".to_string(),
        niche => format!("specifically focusing on '{niche}'"),
    };

    let price = if query.price_tier.is_set() {
        format!("with a price range of '{}'", query.price_tier.label())
    } else {
        "any".to_string()
    };

    let rating = if query.min_rating > 0 {
        format!("with at least a {}-star review rating", query.min_rating)
    } else {
        "any".to_string()
    };

    let mut lines = vec![
        format!(
            "You are an expert business finder. Find the {REQUESTED_RESULTS} most relevant businesses based on the user's criteria."
        ),
        String::new(),
        format!("User Location for Search: {location}"),
        "Search Criteria:".to_string(),
        format!("- Business Category: '{}'", query.category.trim()),
        format!("- Niche: {niche}"),
        format!("- Search Radius: Within {} miles", query.radius),
        format!("- Price Range: {price}"),
        format!("- Minimum Review Rating: {rating}"),
        String::new(),
    ];

    let keywords = query.keywords.trim();
    if !keywords.is_empty() {
        lines.push(format!(
            "The user also provided these specific keywords to focus on: '{keywords}'."
        ));
    }

    if !exclude.is_empty() {
        lines.push(format!(
            "IMPORTANT: Do NOT include any of the following businesses in your response: {}.",
            exclude.join(", ")
        ));
    }

    lines.push(format!(
        "Your response MUST be a valid JSON array of business objects. Each object must have the \
         following keys: 'name', 'category', 'servicesOrProducts' (an array of up to {MAX_SERVICES} \
         strings), 'phone', 'email', 'address', 'mapUrl', and 'webOrSocialUrl'. If a website or \
         social media page is not available, return an empty string for that field."
    ));
    lines.push("Ensure the 'mapUrl' is a direct, valid URL to the business on a map.".to_string());
    lines.push(
        "Provide ONLY the raw JSON array string as the output, with no additional text, \
         explanations, or markdown formatting."
            .to_string(),
    );

    lines.join("\n")
}
