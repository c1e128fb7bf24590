use anyhow::Result;
use std::io::Write;
use swiss_communities::core::ConfigProvider;
use swiss_communities::utils::validation::Validate;
use swiss_communities::{
    CsvRecordSource, EtlEngine, GeoError, IntegrityPolicy, LocalStorage, ModelBuilder,
    QueryService, TomlConfig,
};
use tempfile::TempDir;
use zip::write::{SimpleFileOptions, ZipWriter};

const POLITICAL_CSV: &str = "\
GDENR;GDENAME;GDENAMK;GDEKT;GDEKTNA;GDEBZNR;GDEBZNA;GDEMUTDAT
261;Zürich;Zürich;ZH;Zürich;112;Bezirk Zürich;01.01.2019
247;Schlieren;Schlieren;ZH;Zürich;111;Bezirk Dietikon;01.05.2016
351;Bern;Bern;BE;Bern;246;Verwaltungskreis Bern-Mittelland;01.01.2010
6621;Genève;Genève;GE;Genève;2500;Canton de Genève;01.01.2000
";

const POSTAL_CSV: &str = "\
PLZ4;PLZZ;PLZNAMK;GDENR
8001;00;Zürich;261
8952;00;Schlieren;247
8952;00;Schlieren;261
3000;00;Bern;351
3000;10;Bern Postfach;351
9999;00;Nirgendwo;9999
";

fn write_config(dir: &TempDir, postal_file: &str, integrity: &str) -> Result<TomlConfig> {
    let base_path = dir.path().to_str().unwrap().replace('\\', "/");
    let content = format!(
        r#"
[sources]
base_path = "{}"
political_communities = "gde.csv"
postal_communities = "{}"
delimiter = ";"

[build]
integrity = "{}"

[export]
path = "out/model.json"
"#,
        base_path, postal_file, integrity
    );
    let config_path = dir.path().join("swiss-communities.toml");
    std::fs::write(&config_path, content)?;

    let config = TomlConfig::from_file(&config_path)?;
    config.validate()?;
    Ok(config)
}

fn write_data(dir: &TempDir) -> Result<()> {
    std::fs::write(dir.path().join("gde.csv"), POLITICAL_CSV)?;
    std::fs::write(dir.path().join("plz.csv"), POSTAL_CSV)?;
    Ok(())
}

#[tokio::test]
async fn test_end_to_end_from_csv_files() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_data(&temp_dir)?;
    let config = write_config(&temp_dir, "plz.csv", "lenient")?;

    let storage = LocalStorage::new(config.base_path().to_string());
    let builder = ModelBuilder::new(config.integrity_policy());
    let export_path = config.export_path().map(str::to_string).unwrap();
    let engine = EtlEngine::new(CsvRecordSource::new(storage.clone(), config), builder);

    let (model, report) = engine.run_with_export(&storage, &export_path).await?;
    let queries = QueryService::new(&model);

    assert_eq!(queries.count_cantons(), 3);
    assert_eq!(queries.count_political_communities_in_canton("ZH")?, 2);
    assert_eq!(queries.count_postal_communities(), 5);
    assert_eq!(queries.count_political_communities_without_postal_communities(), 1);
    assert_eq!(queries.districts_for_zip_code("8952").len(), 2);
    assert_eq!(report.unresolved_postal_links, 1);

    let exported = std::fs::read(temp_dir.path().join("out/model.json"))?;
    let json: serde_json::Value = serde_json::from_slice(&exported)?;
    assert_eq!(json["model"]["political_communities"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["report"]["unresolved_postal_links"], 1);
    Ok(())
}

#[tokio::test]
async fn test_strict_policy_fails_on_unknown_community() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_data(&temp_dir)?;
    let config = write_config(&temp_dir, "plz.csv", "strict")?;
    assert_eq!(config.integrity_policy(), IntegrityPolicy::Strict);

    let storage = LocalStorage::new(config.base_path().to_string());
    let builder = ModelBuilder::new(config.integrity_policy());
    let engine = EtlEngine::new(CsvRecordSource::new(storage, config), builder);

    match engine.run().await {
        Err(GeoError::DataIntegrityGap { key, reason, .. }) => {
            assert_eq!(key, "9999/00");
            assert!(reason.contains("9999"));
        }
        other => panic!("expected DataIntegrityGap, got {:?}", other.map(|(_, r)| r)),
    }
    Ok(())
}

#[tokio::test]
async fn test_postal_data_from_zip_archive() -> Result<()> {
    let temp_dir = TempDir::new()?;
    write_data(&temp_dir)?;

    let file = std::fs::File::create(temp_dir.path().join("plz.zip"))?;
    let mut zip = ZipWriter::new(file);
    zip.start_file("PLZO_CSV_LV95/PLZO_CSV_LV95.csv", SimpleFileOptions::default())?;
    zip.write_all(POSTAL_CSV.as_bytes())?;
    zip.finish()?;

    let config = write_config(&temp_dir, "plz.zip", "lenient")?;
    let storage = LocalStorage::new(config.base_path().to_string());
    let builder = ModelBuilder::new(config.integrity_policy());
    let engine = EtlEngine::new(CsvRecordSource::new(storage, config), builder);

    let (model, _) = engine.run().await?;
    let queries = QueryService::new(&model);
    assert_eq!(queries.count_postal_communities(), 5);
    assert_eq!(
        queries.last_update_of_political_community_by_postal_community_name("Bern Postfach"),
        chrono::NaiveDate::from_ymd_opt(2010, 1, 1)
    );
    Ok(())
}
