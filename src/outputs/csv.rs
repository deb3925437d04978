//! CSV export: header `title,url,timestamp,source`, one row per record.
//!
//! Fields containing commas, quotes, or line breaks are quoted with quotes
//! doubled. A missing timestamp is an empty field and reads back as `None`.

use crate::error::{Error, Result};
use crate::models::HeadlineRecord;
use ::csv::{ReaderBuilder, WriterBuilder};

/// Column names, in the order every row is written.
pub const HEADER: [&str; 4] = ["title", "url", "timestamp", "source"];

/// Render `records` as CSV, header first.
///
/// # Returns
///
/// The whole document as a `String`; an empty slice yields the header line
/// alone.
pub fn to_string(records: &[HeadlineRecord]) -> Result<String> {
    // Header written by hand so an empty export still has one.
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(record)?;
    }

    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Parse a CSV export back into records.
///
/// Columns are matched by header name, so their order does not matter.
/// Empty `timestamp` fields read back as `None`.
pub fn from_str(content: &str) -> Result<Vec<HeadlineRecord>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(content.as_bytes());
    let records = reader.deserialize().collect::<std::result::Result<Vec<HeadlineRecord>, _>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, timestamp: Option<&str>) -> HeadlineRecord {
        HeadlineRecord {
            title: title.to_string(),
            url: "https://timesofindia.indiatimes.com/india-gdp-growth-2025".to_string(),
            timestamp: timestamp.map(str::to_string),
            source: "toi".to_string(),
        }
    }

    #[test]
    fn test_header_and_comma_quoting() {
        let csv = to_string(&[record("Breaking, news today", None)]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("title,url,timestamp,source"));
        assert_eq!(
            lines.next(),
            Some("\"Breaking, news today\",https://timesofindia.indiatimes.com/india-gdp-growth-2025,,toi")
        );
    }

    #[test]
    fn test_csv_round_trip_with_comma_and_quotes() {
        let records = vec![
            record("Breaking, news today", Some("2025-01-07T16:45:00Z")),
            record("Chef's \"fusion\" cuisine wins acclaim", None),
            record("Plain headline", Some("3 hours ago")),
        ];
        let csv = to_string(&records).unwrap();
        assert_eq!(from_str(&csv).unwrap(), records);
    }

    #[test]
    fn test_empty_export_has_header_only() {
        let csv = to_string(&[]).unwrap();
        assert_eq!(csv.trim_end(), "title,url,timestamp,source");
        assert!(from_str(&csv).unwrap().is_empty());
    }

    #[test]
    fn test_blank_timestamp_field_is_none() {
        let csv = "title,url,timestamp,source\nSpaces,https://www.npr.org/1,   ,npr\n";
        assert_eq!(from_str(csv).unwrap()[0].timestamp, None);
    }

    #[test]
    fn test_reads_columns_by_name() {
        let csv = "source,title,url,timestamp\nhn,Reordered,https://news.ycombinator.com/item?id=1,\n";
        let records = from_str(csv).unwrap();
        assert_eq!(records[0].title, "Reordered");
        assert_eq!(records[0].timestamp, None);
    }
}
