//! Mapping directory listings onto [`BusinessRecord`].

use bizmatrix_core::{BusinessRecord, SourceTag};

use super::types::YelpBusiness;

/// Keeps listings rated at least `min_rating` and normalizes them.
///
/// A `min_rating` of `0` keeps everything.
#[must_use]
pub fn normalize_listings(listings: Vec<YelpBusiness>, min_rating: u8) -> Vec<BusinessRecord> {
    let floor = f64::from(min_rating);
    listings
        .into_iter()
        .filter(|listing| listing.rating >= floor)
        .map(normalize_listing)
        .collect()
}

fn normalize_listing(listing: YelpBusiness) -> BusinessRecord {
    let category = listing
        .categories
        .into_iter()
        .map(|c| c.title)
        .collect::<Vec<_>>()
        .join(", ");

    // No independent website is exposed, so the listing URL doubles as one.
    BusinessRecord {
        name: listing.name,
        category,
        services_or_products: Vec::new(),
        phone: listing.display_phone,
        email: String::new(),
        address: listing.location.display_address.join(", "),
        map_url: None,
        web_or_social_url: Some(listing.url.clone()),
        directory_url: Some(listing.url),
        source: SourceTag::Directory,
    }
}
