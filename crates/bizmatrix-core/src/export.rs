//! CSV export of accumulated results.

use crate::record::BusinessRecord;

const HEADER: [&str; 10] = [
    "name",
    "category",
    "servicesOrProducts",
    "phone",
    "email",
    "address",
    "mapUrl",
    "webOrSocialUrl",
    "source",
    "directoryUrl",
];

const FILE_PREFIX: &str = "bizmatrix_businesses";

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn row(record: &BusinessRecord) -> String {
    let services = record.services_or_products.join("; ");
    [
        record.name.as_str(),
        record.category.as_str(),
        services.as_str(),
        record.phone.as_str(),
        record.email.as_str(),
        record.address.as_str(),
        record.map_url.as_deref().unwrap_or_default(),
        record.web_or_social_url.as_deref().unwrap_or_default(),
        record.source.as_str(),
        record.directory_url.as_deref().unwrap_or_default(),
    ]
    .iter()
    .map(|v| quote(v))
    .collect::<Vec<_>>()
    .join(",")
}

/// Renders `records` as CSV with the fixed 10-column header.
///
/// Every field is double-quoted with embedded quotes doubled. An empty slice
/// yields an empty string rather than a header-only file.
#[must_use]
pub fn to_csv(records: &[BusinessRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }
    std::iter::once(HEADER.join(","))
        .chain(records.iter().map(row))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download name for the export of every round.
#[must_use]
pub fn all_results_filename() -> String {
    format!("{FILE_PREFIX}_all.csv")
}

/// Download name for one round; `page` is 1-based.
#[must_use]
pub fn page_filename(page: usize) -> String {
    format!("{FILE_PREFIX}_page_{page}.csv")
}
