use crate::core::{ConfigProvider, IntegrityPolicy};
use crate::utils::error::{GeoError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub build: BuildConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_base_path")]
    pub base_path: String,
    pub political_communities: String,
    pub postal_communities: String,
    #[serde(default)]
    pub delimiter: Delimiter,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildConfig {
    #[serde(default)]
    pub integrity: IntegrityPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub verbose: bool,
    #[serde(default)]
    pub json: bool,
}

fn default_base_path() -> String {
    ".".to_string()
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

/// CSV field separator, checked once when the configuration is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Delimiter(u8);

impl Delimiter {
    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl Default for Delimiter {
    fn default() -> Self {
        Self(b',')
    }
}

impl TryFrom<String> for Delimiter {
    type Error = GeoError;

    fn try_from(value: String) -> Result<Self> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for Delimiter {
    type Error = GeoError;

    fn try_from(value: &str) -> Result<Self> {
        validation::validate_delimiter("sources.delimiter", value).map(Self)
    }
}

impl From<Delimiter> for String {
    fn from(delimiter: Delimiter) -> Self {
        char::from(delimiter.0).to_string()
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            political_communities: "political_communities.csv".to_string(),
            postal_communities: "postal_communities.csv".to_string(),
            delimiter: Delimiter::default(),
            date_format: default_date_format(),
        }
    }
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GeoError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GeoError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SWISS_DATA_DIR})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GeoError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("sources.base_path", &self.sources.base_path)?;
        validation::validate_path(
            "sources.political_communities",
            &self.sources.political_communities,
        )?;
        validation::validate_path("sources.postal_communities", &self.sources.postal_communities)?;
        validation::validate_file_extensions(
            "sources",
            &[
                self.sources.political_communities.as_str(),
                self.sources.postal_communities.as_str(),
            ],
            &["csv", "txt", "zip"],
        )?;
        validation::validate_date_format("sources.date_format", &self.sources.date_format)?;

        if let Some(path) = &self.export.path {
            validation::validate_path("export.path", path)?;
            validation::validate_file_extensions("export.path", &[path.as_str()], &["json"])?;
        }

        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.sources.base_path
    }
}

impl ConfigProvider for TomlConfig {
    fn political_communities_path(&self) -> &str {
        &self.sources.political_communities
    }

    fn postal_communities_path(&self) -> &str {
        &self.sources.postal_communities
    }

    fn delimiter(&self) -> u8 {
        self.sources.delimiter.as_byte()
    }

    fn date_format(&self) -> &str {
        &self.sources.date_format
    }

    fn integrity_policy(&self) -> IntegrityPolicy {
        self.build.integrity
    }

    fn export_path(&self) -> Option<&str> {
        self.export.path.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
