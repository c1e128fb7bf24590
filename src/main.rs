use clap::Parser;
use swiss_communities::app::commands::{self, Command};
use swiss_communities::core::ConfigProvider;
use swiss_communities::utils::error::{ErrorSeverity, GeoError};
use swiss_communities::utils::logger;
use swiss_communities::utils::validation::validate_required_field;
use swiss_communities::{
    CliConfig, CsvRecordSource, EtlEngine, LocalStorage, ModelBuilder, QueryService, TomlConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 先合併配置，日誌設定也可能來自配置檔
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    logger::init_cli_logger(config.logging.verbose, config.logging.json);
    tracing::info!("Starting swiss-communities");
    tracing::debug!("Resolved config: {:?}", config);

    if let Err(e) = run(&cli, config).await {
        tracing::error!(
            "❌ Command failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 4, // 查詢不到
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

async fn run(cli: &CliConfig, config: TomlConfig) -> Result<(), GeoError> {
    let export_path = config.export_path().map(str::to_string);
    if cli.command == Command::Export {
        validate_required_field("export.path", &export_path)?;
    }

    let storage = LocalStorage::new(config.base_path().to_string());
    let builder = ModelBuilder::new(config.integrity_policy());
    let engine = EtlEngine::new(CsvRecordSource::new(storage.clone(), config), builder);

    let (model, report) = match &export_path {
        Some(path) => engine.run_with_export(&storage, path).await?,
        None => engine.run().await?,
    };
    tracing::info!("✅ Model ready");

    let queries = QueryService::new(&model);
    let output = commands::execute(&cli.command, &queries, &report)?;
    println!("{}", output.render(cli.json)?);

    Ok(())
}
