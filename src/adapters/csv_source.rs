use crate::core::{ConfigProvider, RecordSource, Storage};
use crate::domain::records::{PoliticalCommunityRow, PostalCommunityRow};
use crate::utils::error::{GeoError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::{Cursor, Read};

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// 欄位名稱同時接受描述性名稱與官方資料集的欄位代碼
#[derive(Debug, Deserialize)]
struct CsvPoliticalCommunity {
    #[serde(alias = "GDENR")]
    number: String,
    #[serde(alias = "GDENAME")]
    name: String,
    #[serde(alias = "GDENAMK")]
    short_name: String,
    #[serde(alias = "GDEKT")]
    canton_code: String,
    #[serde(alias = "GDEKTNA")]
    canton_name: String,
    #[serde(alias = "GDEBZNR")]
    district_number: String,
    #[serde(alias = "GDEBZNA")]
    district_name: String,
    #[serde(alias = "GDEMUTDAT")]
    last_update: String,
}

#[derive(Debug, Deserialize)]
struct CsvPostalCommunity {
    #[serde(alias = "PLZ4")]
    zip_code: String,
    #[serde(alias = "PLZZ", default)]
    zip_code_addition: String,
    #[serde(alias = "PLZNAMK")]
    name: String,
    #[serde(alias = "GDENR")]
    political_community_number: String,
}

/// Reads both datasets as CSV (optionally zipped) through a [`Storage`].
pub struct CsvRecordSource<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CsvRecordSource<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn read_csv(&self, path: &str) -> Result<Vec<u8>> {
        let data = self.storage.read_file(path).await?;
        if path.to_ascii_lowercase().ends_with(".zip") {
            tracing::debug!("Unpacking CSV from archive {}", path);
            extract_first_csv(data)
        } else {
            Ok(data)
        }
    }

    fn parse_date(&self, value: &str, source_name: &str, line: u64) -> Result<NaiveDate> {
        NaiveDate::parse_from_str(value, self.config.date_format())
            .or_else(|_| NaiveDate::parse_from_str(value, ISO_DATE_FORMAT))
            .map_err(|e| GeoError::InvalidRecord {
                source_name: source_name.to_string(),
                line,
                reason: format!(
                    "cannot parse date '{}' with format '{}': {}",
                    value,
                    self.config.date_format(),
                    e
                ),
            })
    }
}

#[async_trait]
impl<S: Storage, C: ConfigProvider> RecordSource for CsvRecordSource<S, C> {
    async fn political_communities(&self) -> Result<Vec<PoliticalCommunityRow>> {
        let path = self.config.political_communities_path();
        let data = self.read_csv(path).await?;

        let raw: Vec<(u64, CsvPoliticalCommunity)> = parse_records(&data, self.config.delimiter())?;
        tracing::debug!("Parsed {} rows from {}", raw.len(), path);

        raw.into_iter()
            .map(|(line, row)| {
                let last_update = self.parse_date(&row.last_update, path, line)?;
                Ok(PoliticalCommunityRow {
                    number: row.number,
                    name: row.name,
                    short_name: row.short_name,
                    canton_code: row.canton_code,
                    canton_name: row.canton_name,
                    district_number: row.district_number,
                    district_name: row.district_name,
                    last_update,
                })
            })
            .collect()
    }

    async fn postal_communities(&self) -> Result<Vec<PostalCommunityRow>> {
        let path = self.config.postal_communities_path();
        let data = self.read_csv(path).await?;

        let raw: Vec<(u64, CsvPostalCommunity)> = parse_records(&data, self.config.delimiter())?;
        tracing::debug!("Parsed {} rows from {}", raw.len(), path);

        Ok(raw
            .into_iter()
            .map(|(_, row)| PostalCommunityRow {
                zip_code: row.zip_code,
                zip_code_addition: row.zip_code_addition,
                name: row.name,
                political_community_number: row.political_community_number,
            })
            .collect())
    }
}

/// Deserializes every record, keeping the line it started on.
fn parse_records<T: DeserializeOwned>(data: &[u8], delimiter: u8) -> Result<Vec<(u64, T)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(data);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let row: T = record.deserialize(Some(&headers))?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn extract_first_csv(archive_data: Vec<u8>) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(archive_data))?;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_dir() && entry.name().to_ascii_lowercase().ends_with(".csv") {
            tracing::debug!("Using archive entry {}", entry.name());
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            return Ok(data);
        }
    }
    Err(GeoError::ZipError(zip::result::ZipError::FileNotFound))
}
