//! Shared test fixtures for the coviscope integration tests.
//!
//! Provides `setup_sample_db()` which creates an in-memory DuckDB store
//! populated with a small `covid19` table via an NDJSON temp file.
#![allow(dead_code)]

use coviscope::Store;
use std::io::Write;
use tempfile::NamedTempFile;

/// Daily `new_confirmed` per location. Every location reports the same value
/// on each of the three January days. TR and AR tie at 10, so the top-10
/// selection must keep AR and drop TR; CO is always 11th.
pub const DAILY_CONFIRMED: &[(&str, i64)] = &[
    ("US", 100),
    ("IN", 90),
    ("BR", 80),
    ("FR", 70),
    ("GB", 60),
    ("DE", 50),
    ("IT", 40),
    ("ES", 30),
    ("RU", 20),
    ("TR", 10),
    ("AR", 10),
    ("CO", 5),
];

pub const JANUARY_DAYS: &[&str] = &["2021-01-01", "2021-01-02", "2021-01-03"];

/// Create an in-memory `Store` loaded with the sample rows.
///
/// Besides the January rows there is one row before and one after the
/// range. The February CO row is large enough that CO would rank first if a
/// query ignored the date range.
pub fn setup_sample_db() -> Store {
    let store = Store::open_in_memory().unwrap();
    load_rows(&store, &sample_rows());
    store
}

pub fn sample_rows() -> Vec<serde_json::Value> {
    let mut rows = Vec::new();
    for (day_idx, day) in JANUARY_DAYS.iter().enumerate() {
        for (location, confirmed) in DAILY_CONFIRMED {
            rows.push(row(day, location, *confirmed, (day_idx as i64 + 1) * confirmed));
        }
    }
    rows.push(row("2020-12-31", "US", 1, 1));
    rows.push(row("2021-02-01", "CO", 100_000, 100_000));
    rows
}

pub fn row(date: &str, location: &str, confirmed: i64, cumulative: i64) -> serde_json::Value {
    serde_json::json!({
        "date": date,
        "location_key": location,
        "new_confirmed": confirmed,
        "new_deceased": confirmed / 10,
        "cumulative_confirmed": cumulative
    })
}

/// Write rows as NDJSON to a temp file and import them with
/// `Store::load_ndjson`.
pub fn load_rows(store: &Store, rows: &[serde_json::Value]) {
    let mut file = NamedTempFile::new().unwrap();
    for row in rows {
        writeln!(file, "{}", serde_json::to_string(row).unwrap()).unwrap();
    }
    file.flush().unwrap();

    store.load_ndjson(file.path()).unwrap();
    // The temp file is dropped here; DuckDB has already copied the rows
    // into its own table.
}

/// The ten locations the per-country chart should select by default.
pub fn expected_top_locations() -> Vec<&'static str> {
    let mut top: Vec<&str> = DAILY_CONFIRMED
        .iter()
        .map(|(loc, _)| *loc)
        .filter(|loc| *loc != "TR" && *loc != "CO")
        .collect();
    top.sort();
    top
}
