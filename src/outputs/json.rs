//! JSON export for the presentation layer and for files.
//!
//! The document is a plain array; `timestamp` is written as `null` when
//! the source did not provide one:
//!
//! ```json
//! [
//!   {
//!     "title": "Comet visible tonight",
//!     "url": "https://www.npr.org/2025/01/09/comet",
//!     "timestamp": null,
//!     "source": "npr"
//!   }
//! ]
//! ```

use crate::error::Result;
use crate::models::HeadlineRecord;

/// Render `records` as a pretty-printed JSON array.
pub fn to_string(records: &[HeadlineRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

/// Parse a JSON array of records.
///
/// A missing, `null`, or blank `timestamp` reads back as `None`.
pub fn from_str(content: &str) -> Result<Vec<HeadlineRecord>> {
    Ok(serde_json::from_str(content)?)
}
