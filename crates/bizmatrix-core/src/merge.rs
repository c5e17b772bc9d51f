//! Reconciliation of the two providers' result lists for one search round.

use std::collections::HashMap;

use crate::record::{BusinessRecord, SourceTag};

/// Lower-cases `s` and drops every character outside `[a-z0-9]`.
fn normalize_key_part(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Approximate real-world identity of a business: normalized name followed by
/// the normalized first comma-separated segment of its address.
#[must_use]
pub fn identity_key(record: &BusinessRecord) -> String {
    let mut key = normalize_key_part(&record.name);
    key.push_str(&normalize_key_part(record.address_head()));
    key
}

/// Insertion-ordered records indexed by [`identity_key`].
#[derive(Default)]
struct KeyedRecords {
    records: Vec<BusinessRecord>,
    index: HashMap<String, usize>,
}

impl KeyedRecords {
    /// Inserts `record` under its key, or hands the existing entry to `update`.
    fn insert_or_update<F>(&mut self, record: BusinessRecord, update: F)
    where
        F: FnOnce(&mut BusinessRecord, BusinessRecord),
    {
        let key = identity_key(&record);
        if let Some(&pos) = self.index.get(&key) {
            update(&mut self.records[pos], record);
        } else {
            self.index.insert(key, self.records.len());
            self.records.push(record);
        }
    }

    fn into_records(self) -> Vec<BusinessRecord> {
        self.records
    }
}

/// Folds a directory listing into an AI record that describes the same business.
///
/// AI fields win; only provenance, the listing URL and a missing web URL come
/// from the directory side.
fn absorb_directory_match(existing: &mut BusinessRecord, directory: BusinessRecord) {
    existing.source = SourceTag::Both;
    if !existing.has_web_url() && directory.has_web_url() {
        existing.web_or_social_url = directory.web_or_social_url;
    }
    existing.directory_url = directory.directory_url;
}

/// Merges one round's AI and directory results into a deduplicated list.
///
/// AI records come first in their original order, followed by directory
/// records whose identity did not match an AI record. A directory record
/// matching an AI record is folded into it and tagged [`SourceTag::Both`].
/// Within the AI list a later record with the same key replaces the earlier
/// one but keeps its position. Only the first directory listing per key is
/// used; later listings for a key that already has one are dropped.
#[must_use]
pub fn merge_results(
    ai_results: Vec<BusinessRecord>,
    directory_results: Vec<BusinessRecord>,
) -> Vec<BusinessRecord> {
    let mut merged = KeyedRecords::default();

    for record in ai_results {
        merged.insert_or_update(record, |existing, incoming| *existing = incoming);
    }

    for record in directory_results {
        merged.insert_or_update(record, |existing, incoming| {
            if existing.source == SourceTag::Ai {
                absorb_directory_match(existing, incoming);
            }
        });
    }

    merged.into_records()
}
