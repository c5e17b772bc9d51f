//! Seams between the session and the concrete business-data providers.

use std::future::Future;

use crate::query::{GeoPoint, SearchQuery};
use crate::record::BusinessRecord;

/// A generative-AI provider that can be told which businesses to leave out.
pub trait AiSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Label used in user-facing error fragments.
    fn label(&self) -> &'static str {
        "AI"
    }

    /// Finds businesses matching `query`, skipping any named in `exclude`.
    fn find_businesses(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
        exclude: &[String],
    ) -> impl Future<Output = Result<Vec<BusinessRecord>, Self::Error>> + Send;
}

/// A local-search directory provider. It has no exclusion capability.
pub trait DirectorySource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn label(&self) -> &'static str {
        "Directory"
    }

    fn find_businesses(
        &self,
        query: &SearchQuery,
        location: Option<GeoPoint>,
    ) -> impl Future<Output = Result<Vec<BusinessRecord>, Self::Error>> + Send;
}
