//! The provider-neutral business record every adapter normalizes into.

use serde::{Deserialize, Serialize};

/// Which provider(s) reported a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "Directory")]
    Directory,
    /// Found independently by both providers in the same round.
    #[serde(rename = "AI & Directory")]
    Both,
}

impl SourceTag {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::Ai => "AI",
            SourceTag::Directory => "Directory",
            SourceTag::Both => "AI & Directory",
        }
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A normalized business listing.
///
/// `name` is the display key and the key used for cross-round exclusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub name: String,
    pub category: String,
    pub services_or_products: Vec<String>,
    pub phone: String,
    pub email: String,
    /// Single-line, comma-separated address.
    pub address: String,
    pub map_url: Option<String>,
    pub web_or_social_url: Option<String>,
    /// Listing URL on the directory provider; only set for directory-sourced data.
    pub directory_url: Option<String>,
    pub source: SourceTag,
}

impl BusinessRecord {
    /// First comma-delimited segment of the address (usually the street line).
    #[must_use]
    pub fn address_head(&self) -> &str {
        self.address.split(',').next().unwrap_or_default()
    }

    /// True when the record has a non-blank web or social URL.
    #[must_use]
    pub fn has_web_url(&self) -> bool {
        self.web_or_social_url
            .as_deref()
            .is_some_and(|u| !u.trim().is_empty())
    }
}
