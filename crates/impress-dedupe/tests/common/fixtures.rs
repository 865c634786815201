//! Test fixture loading utilities

use std::path::PathBuf;

use impress_dedupe::{IndexSet, Record, RecordIndex};

/// Get the path to a fixture file
#[allow(dead_code)]
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_fixtures")
        .join(name)
}

/// Load a fixture file as a string
#[allow(dead_code)]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name))
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", name))
}

/// Load a JSON array of records
#[allow(dead_code)]
pub fn load_records_fixture(name: &str) -> Vec<Record> {
    serde_json::from_str(&load_fixture(&format!("records/{}", name)))
        .unwrap_or_else(|e| panic!("Invalid records fixture {}: {}", name, e))
}

/// Records with one field per tuple position; `None` leaves the field null
#[allow(dead_code)]
pub fn records_from_rows(fields: &[&str], rows: &[&[Option<&str>]]) -> Vec<Record> {
    rows.iter()
        .map(|row| {
            let mut record = Record::new();
            for (field, value) in fields.iter().zip(row.iter()) {
                record.set(*field, value.map(str::to_string));
            }
            record
        })
        .collect()
}

/// Records carrying only a title
#[allow(dead_code)]
pub fn titled(titles: &[&str]) -> Vec<Record> {
    titles
        .iter()
        .map(|title| Record::new().with("title", *title))
        .collect()
}

/// Index set over list 0
#[allow(dead_code)]
pub fn indexes(members: &[usize]) -> IndexSet {
    members.iter().map(|&r| RecordIndex::new(0, r)).collect()
}

/// Sort a set list so comparisons ignore order
#[allow(dead_code)]
pub fn sorted(mut sets: Vec<IndexSet>) -> Vec<IndexSet> {
    sets.sort();
    sets
}
