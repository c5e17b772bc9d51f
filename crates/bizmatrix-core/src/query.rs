//! The structured search query and the optional user location.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest accepted minimum-rating filter.
pub const MAX_RATING: u8 = 5;

const DEFAULT_RADIUS_MILES: f64 = 5.0;

/// Price bracket filter. `Unset` means "any price".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTier {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "$")]
    One,
    #[serde(rename = "$$")]
    Two,
    #[serde(rename = "$$$")]
    Three,
    #[serde(rename = "$$$$")]
    Four,
}

impl PriceTier {
    /// The dollar-sign label, empty for `Unset`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PriceTier::Unset => "",
            PriceTier::One => "$",
            PriceTier::Two => "$$",
            PriceTier::Three => "$$$",
            PriceTier::Four => "$$$$",
        }
    }

    /// The directory provider's coded price level (`"1"`..`"4"`).
    #[must_use]
    pub fn directory_code(self) -> Option<&'static str> {
        match self {
            PriceTier::Unset => None,
            PriceTier::One => Some("1"),
            PriceTier::Two => Some("2"),
            PriceTier::Three => Some("3"),
            PriceTier::Four => Some("4"),
        }
    }

    #[must_use]
    pub fn is_set(self) -> bool {
        self != PriceTier::Unset
    }
}

/// User-entered search criteria.
///
/// Equality is structural: resubmitting a query with identical fields is a
/// continuation of the previous search, not a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub category: String,
    #[serde(default)]
    pub niche: String,
    /// Free-form address or area. Empty means "use coordinates".
    #[serde(default)]
    pub location_text: String,
    /// Search radius in miles.
    #[serde(default = "default_radius")]
    pub radius: f64,
    #[serde(default)]
    pub price_tier: PriceTier,
    /// Minimum star rating, `0` for no filter.
    #[serde(default)]
    pub min_rating: u8,
    #[serde(default)]
    pub keywords: String,
}

fn default_radius() -> f64 {
    DEFAULT_RADIUS_MILES
}

/// Reasons a [`SearchQuery`] is rejected before any provider is called.
#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("category is required")]
    EmptyCategory,

    #[error("radius must be a positive number of miles, got {0}")]
    InvalidRadius(f64),

    #[error("minimum rating must be between 0 and 5, got {0}")]
    InvalidMinRating(u8),
}

impl SearchQuery {
    /// Creates a query for `category` with every other field at its default.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            niche: String::new(),
            location_text: String::new(),
            radius: DEFAULT_RADIUS_MILES,
            price_tier: PriceTier::Unset,
            min_rating: 0,
            keywords: String::new(),
        }
    }

    /// Checks the invariants the providers rely on.
    ///
    /// # Errors
    ///
    /// Returns the first [`QueryError`] found.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.category.trim().is_empty() {
            return Err(QueryError::EmptyCategory);
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(QueryError::InvalidRadius(self.radius));
        }
        if self.min_rating > MAX_RATING {
            return Err(QueryError::InvalidMinRating(self.min_rating));
        }
        Ok(())
    }

    /// The trimmed location text, or `None` when the user left it blank.
    #[must_use]
    pub fn location_text(&self) -> Option<&str> {
        let trimmed = self.location_text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// A latitude/longitude pair supplied by the user's device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Returns the point if both coordinates are finite and in range.
    #[must_use]
    pub fn validated(self) -> Option<Self> {
        let lat_ok = self.latitude.is_finite() && self.latitude.abs() <= 90.0;
        let lon_ok = self.longitude.is_finite() && self.longitude.abs() <= 180.0;
        (lat_ok && lon_ok).then_some(self)
    }
}
