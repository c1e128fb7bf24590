use std::fmt;
use thiserror::Error;

/// 模型中的實體種類，用於錯誤訊息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Canton,
    District,
    PoliticalCommunity,
    PostalCommunity,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Canton => "canton",
            EntityKind::District => "district",
            EntityKind::PoliticalCommunity => "political community",
            EntityKind::PostalCommunity => "postal community",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Unknown {entity}: {key}")]
    NotFound { entity: EntityKind, key: String },

    #[error("Data integrity gap in {entity} '{key}': {reason}")]
    DataIntegrityGap {
        entity: EntityKind,
        key: String,
        reason: String,
    },

    #[error("Invalid record in {source_name} at line {line}: {reason}")]
    InvalidRecord {
        source_name: String,
        line: u64,
        reason: String,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Query,
    Data,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl GeoError {
    pub fn not_found(entity: EntityKind, key: impl Into<String>) -> Self {
        GeoError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn integrity_gap(
        entity: EntityKind,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        GeoError::DataIntegrityGap {
            entity,
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            GeoError::NotFound { .. } => ErrorCategory::Query,
            GeoError::DataIntegrityGap { .. }
            | GeoError::InvalidRecord { .. }
            | GeoError::CsvError(_)
            | GeoError::SerializationError(_) => ErrorCategory::Data,
            GeoError::ZipError(_) | GeoError::IoError(_) => ErrorCategory::Io,
            GeoError::ConfigError { .. }
            | GeoError::ConfigValidationError { .. }
            | GeoError::InvalidConfigValueError { .. }
            | GeoError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 查詢不到只是使用者輸入問題
            ErrorCategory::Query => ErrorSeverity::Low,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            GeoError::NotFound { entity, .. } => match entity {
                EntityKind::Canton => "Use the `cantons` command to list known canton codes",
                EntityKind::District => "Check the district number against the political community data",
                _ => "Check the lookup key against the loaded data",
            },
            GeoError::DataIntegrityGap { .. } => {
                "Fix the referenced rows in the source data or rebuild with the lenient integrity policy"
            }
            GeoError::InvalidRecord { .. } | GeoError::CsvError(_) => {
                "Check the CSV delimiter, header names and date format of the source files"
            }
            GeoError::ZipError(_) => "Make sure the archive is a valid ZIP containing a .csv file",
            GeoError::IoError(_) => "Make sure the data files exist and are readable",
            GeoError::SerializationError(_) => "Check that the export target is writable",
            GeoError::ConfigError { .. }
            | GeoError::ConfigValidationError { .. }
            | GeoError::InvalidConfigValueError { .. }
            | GeoError::MissingConfigError { .. } => {
                "Review the configuration file and command line flags"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            GeoError::NotFound { entity, key } => format!("No {} found for '{}'", entity, key),
            GeoError::DataIntegrityGap { entity, key, reason } => {
                format!("Source data is inconsistent ({} '{}'): {}", entity, key, reason)
            }
            GeoError::MissingConfigError { field } => {
                format!("Please provide a value for '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
