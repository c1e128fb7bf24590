use crate::app::commands::Command;
use crate::config::toml_config::{Delimiter, TomlConfig};
use crate::core::IntegrityPolicy;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "swiss-communities")]
#[command(about = "Normalize Swiss political and postal community data and query it")]
pub struct CliConfig {
    /// Path to a TOML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory the data files are resolved against
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(long)]
    pub political_communities: Option<String>,

    #[arg(long)]
    pub postal_communities: Option<String>,

    #[arg(long)]
    pub delimiter: Option<String>,

    /// chrono format of the last-update column, e.g. %d.%m.%Y
    #[arg(long)]
    pub date_format: Option<String>,

    #[arg(long, value_enum)]
    pub integrity: Option<IntegrityPolicy>,

    /// Write the normalized model as JSON to this path (relative to the data dir)
    #[arg(long)]
    pub export: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    #[arg(long, help = "Print query results as JSON")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Merges the optional TOML file with the command line flags and
    /// validates the result.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(dir) = &self.data_dir {
            config.sources.base_path = dir.clone();
        }
        if let Some(path) = &self.political_communities {
            config.sources.political_communities = path.clone();
        }
        if let Some(path) = &self.postal_communities {
            config.sources.postal_communities = path.clone();
        }
        if let Some(delimiter) = &self.delimiter {
            config.sources.delimiter = Delimiter::try_from(delimiter.as_str())?;
        }
        if let Some(format) = &self.date_format {
            config.sources.date_format = format.clone();
        }
        if let Some(policy) = self.integrity {
            config.build.integrity = policy;
        }
        if let Some(path) = &self.export {
            config.export.path = Some(path.clone());
        }
        config.logging.verbose |= self.verbose;
        config.logging.json |= self.log_json;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_flags_without_config_file() {
        let cli = CliConfig::parse_from([
            "swiss-communities",
            "--data-dir",
            "data",
            "--delimiter",
            ";",
            "--integrity",
            "strict",
            "canton-communities",
            "ZH",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.base_path(), "data");
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.integrity_policy(), IntegrityPolicy::Strict);
        assert!(matches!(cli.command, Command::CantonCommunities { ref code } if code == "ZH"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                br#"
[sources]
base_path = "from-file"
political_communities = "gde.csv"
postal_communities = "plz.csv"
"#,
            )
            .unwrap();
        let path = temp_file.path().to_str().unwrap().to_string();

        let cli = CliConfig::parse_from([
            "swiss-communities",
            "--config",
            path.as_str(),
            "--postal-communities",
            "plz.zip",
            "--verbose",
            "summary",
        ]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.base_path(), "from-file");
        assert_eq!(config.postal_communities_path(), "plz.zip");
        assert!(config.logging.verbose);
    }

    #[test]
    fn test_invalid_flag_value_fails_validation() {
        let cli = CliConfig::parse_from(["swiss-communities", "--date-format", "%Y", "cantons"]);
        assert!(cli.resolve().is_err());
    }

    #[test]
    fn test_invalid_delimiter_flag_is_rejected() {
        let cli = CliConfig::parse_from(["swiss-communities", "--delimiter", ";;", "cantons"]);
        let err = cli.resolve().unwrap_err();
        assert!(err.to_string().contains("sources.delimiter"));
    }
}
