//! exrate Feed Formats
//!
//! Wire types for rate imports. The JSON import document is what the
//! import engine consumes; the fixed-width settlement rate file is the
//! upstream format it is usually produced from.

pub mod document;
pub mod error;
pub mod settlement_file;
pub mod discovery;

pub use document::*;
pub use error::{FeedError, FeedResult};
pub use settlement_file::{parse_settlement_file, read_settlement_file};
pub use discovery::latest_rate_file;

use std::path::Path;

/// Load a feed from disk. `.json` files are read as import documents,
/// anything else as a fixed-width settlement rate file.
pub fn load_feed(path: &Path) -> FeedResult<RateFeed> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        let contents = std::fs::read_to_string(path)?;
        RateFeed::from_json(&contents)
    } else {
        read_settlement_file(path)
    }
}
