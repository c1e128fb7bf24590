use crate::core::builder::{BuildReport, ModelBuilder};
use crate::core::{Model, RecordSource, Storage};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct ExportDocument<'a> {
    report: &'a BuildReport,
    model: crate::domain::model::ModelSnapshot<'a>,
}

/// Extract rows from a [`RecordSource`], build the model and optionally load
/// it as JSON into a [`Storage`].
pub struct EtlEngine<R: RecordSource> {
    source: R,
    builder: ModelBuilder,
}

impl<R: RecordSource> EtlEngine<R> {
    pub fn new(source: R, builder: ModelBuilder) -> Self {
        Self { source, builder }
    }

    pub async fn run(&self) -> Result<(Model, BuildReport)> {
        tracing::info!("📥 Extracting political communities...");
        let political_rows = self.source.political_communities().await?;
        tracing::info!("📥 Extracted {} political community rows", political_rows.len());

        tracing::info!("📥 Extracting postal communities...");
        let postal_rows = self.source.postal_communities().await?;
        tracing::info!("📥 Extracted {} postal community rows", postal_rows.len());

        tracing::info!("🔄 Normalizing with {:?} integrity policy", self.builder.policy());
        self.builder.build_with_report(&political_rows, &postal_rows)
    }

    pub async fn run_with_export<S: Storage>(
        &self,
        storage: &S,
        export_path: &str,
    ) -> Result<(Model, BuildReport)> {
        let (model, report) = self.run().await?;

        tracing::info!("💾 Exporting model to: {}", export_path);
        let document = ExportDocument {
            report: &report,
            model: model.snapshot(),
        };
        let json = serde_json::to_vec_pretty(&document)?;
        tracing::debug!("Writing export ({} bytes) to storage", json.len());
        storage.write_file(export_path, &json).await?;

        Ok((model, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemorySource;
    use crate::domain::records::{PoliticalCommunityRow, PostalCommunityRow};
    use crate::utils::error::GeoError;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                GeoError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn source() -> InMemorySource {
        InMemorySource::new(
            vec![PoliticalCommunityRow {
                number: "261".to_string(),
                name: "Zürich".to_string(),
                short_name: "Zürich".to_string(),
                canton_code: "ZH".to_string(),
                canton_name: "Zürich".to_string(),
                district_number: "112".to_string(),
                district_name: "Bezirk Zürich".to_string(),
                last_update: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
            }],
            vec![PostalCommunityRow {
                zip_code: "8001".to_string(),
                zip_code_addition: "00".to_string(),
                name: "Zürich".to_string(),
                political_community_number: "261".to_string(),
            }],
        )
    }

    #[tokio::test]
    async fn test_run_builds_model() {
        let engine = EtlEngine::new(source(), ModelBuilder::default());
        let (model, report) = engine.run().await.unwrap();

        assert_eq!(model.cantons().count(), 1);
        assert_eq!(model.postal_communities().count(), 1);
        assert_eq!(report.political_rows, 1);
        assert_eq!(report.postal_rows, 1);
    }

    #[tokio::test]
    async fn test_run_with_export_writes_json() {
        let storage = MockStorage::default();
        let engine = EtlEngine::new(source(), ModelBuilder::default());
        engine.run_with_export(&storage, "model.json").await.unwrap();

        let data = storage.read_file("model.json").await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&data).unwrap();
        assert_eq!(json["model"]["cantons"][0]["code"], "ZH");
        assert_eq!(json["model"]["postal_communities"][0]["zip_code"], "8001");
        assert_eq!(
            json["model"]["postal_communities"][0]["political_community_numbers"][0],
            "261"
        );
        assert_eq!(json["report"]["unresolved_postal_links"], 0);
    }
}
