//! Export of headline records to JSON and CSV.
//!
//! # Submodules
//!
//! - [`json`]: array of `{title, url, timestamp, source}` objects
//! - [`csv`]: `title,url,timestamp,source` header plus one row per record
//!
//! Both formats read back to exactly the records written.
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── headlines-20250107-101500.json
//! └── headlines-20250107-103000.csv
//! ```

pub mod csv;
pub mod json;

use crate::error::Result;
use crate::models::HeadlineRecord;
use crate::utils::ensure_writable_dir;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// File format of a headline export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Serialize `records` in this format.
    pub fn render(self, records: &[HeadlineRecord]) -> Result<String> {
        match self {
            ExportFormat::Json => json::to_string(records),
            ExportFormat::Csv => csv::to_string(records),
        }
    }

    /// Read records back from a document in this format.
    pub fn parse(self, content: &str) -> Result<Vec<HeadlineRecord>> {
        match self {
            ExportFormat::Json => json::from_str(content),
            ExportFormat::Csv => csv::from_str(content),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// `headlines-YYYYmmdd-HHMMSS.<ext>`
pub fn export_filename(format: ExportFormat, at: DateTime<Utc>) -> String {
    format!("headlines-{}.{}", at.format("%Y%m%d-%H%M%S"), format.extension())
}

/// Write `records` to a timestamped file in `output_dir`.
///
/// # Arguments
///
/// * `output_dir` - Target directory, created if missing
/// * `format` - JSON or CSV
/// * `records` - Headlines to write
///
/// # Returns
///
/// The path written, or `Ok(None)` without touching the file system when
/// there is nothing to write.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %format))]
pub async fn write_export(
    output_dir: &Path,
    format: ExportFormat,
    records: &[HeadlineRecord],
) -> Result<Option<PathBuf>> {
    if records.is_empty() {
        info!("No headlines to export");
        return Ok(None);
    }

    ensure_writable_dir(output_dir).await?;
    let path = output_dir.join(export_filename(format, Utc::now()));
    let content = format.render(records)?;

    fs::write(&path, content).await?;
    info!(path = %path.display(), count = records.len(), "Wrote headline export");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Vec<HeadlineRecord> {
        vec![HeadlineRecord {
            title: "Breaking, news today".to_string(),
            url: "https://www.bbc.com/news/world-1".to_string(),
            timestamp: Some("2025-01-05T08:00:00Z".to_string()),
            source: "bbc".to_string(),
        }]
    }

    #[test]
    fn test_export_filename() {
        let at = Utc.with_ymd_and_hms(2025, 1, 7, 10, 15, 0).unwrap();
        assert_eq!(export_filename(ExportFormat::Json, at), "headlines-20250107-101500.json");
        assert_eq!(export_filename(ExportFormat::Csv, at), "headlines-20250107-101500.csv");
    }

    #[tokio::test]
    async fn test_write_export_round_trips() {
        let tmp = tempfile::tempdir().unwrap();
        for format in [ExportFormat::Json, ExportFormat::Csv] {
            let dir = tmp.path().join(format.extension());
            let path = write_export(&dir, format, &sample()).await.unwrap().unwrap();
            assert_eq!(path.extension().unwrap(), format.extension());

            let content = std::fs::read_to_string(&path).unwrap();
            assert_eq!(format.parse(&content).unwrap(), sample());
        }
    }

    #[test]
    fn test_json_import_then_csv_export_keeps_records() {
        let json = r#"[{"title": "Quiet day", "url": "https://www.bbc.com/news/1", "timestamp": "", "source": "bbc"}]"#;
        let imported = ExportFormat::Json.parse(json).unwrap();
        let csv = ExportFormat::Csv.render(&imported).unwrap();
        assert_eq!(ExportFormat::Csv.parse(&csv).unwrap(), imported);
    }

    #[tokio::test]
    async fn test_write_export_skips_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("never-created");
        assert!(write_export(&dir, ExportFormat::Json, &[]).await.unwrap().is_none());
        assert!(!dir.exists());
    }
}
