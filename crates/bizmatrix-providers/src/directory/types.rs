//! Response types for the directory `businesses/search` endpoint.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct YelpSearchResponse {
    /// Absent on some empty responses; treated as no listings.
    #[serde(default)]
    pub businesses: Option<Vec<YelpBusiness>>,
}

#[derive(Debug, Deserialize)]
pub struct YelpBusiness {
    pub name: String,
    pub url: String,
    pub rating: f64,
    #[serde(default)]
    pub categories: Vec<YelpCategory>,
    #[serde(default)]
    pub display_phone: String,
    pub location: YelpLocation,
}

#[derive(Debug, Deserialize)]
pub struct YelpCategory {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct YelpLocation {
    pub display_address: Vec<String>,
}

/// Error body: `{ "error": { "code": "...", "description": "..." } }`.
#[derive(Debug, Deserialize)]
pub struct YelpErrorBody {
    pub error: YelpErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct YelpErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl YelpErrorBody {
    /// `"{description} ({code})"`, or whichever half is present.
    #[must_use]
    pub fn into_description(self) -> Option<String> {
        let YelpErrorDetail { code, description } = self.error;
        match (description, code) {
            (Some(description), Some(code)) => Some(format!("{description} ({code})")),
            (Some(description), None) => Some(description),
            (None, code) => code,
        }
    }
}
