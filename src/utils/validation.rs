use crate::utils::error::{GeoError, Result};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt::Write;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(GeoError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(GeoError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(field_name: &str, files: &[&str], allowed_extensions: &[&str]) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        if let Some(extension) = std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            if !allowed_set.contains(extension.to_ascii_lowercase().as_str()) {
                return Err(GeoError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
        } else {
            return Err(GeoError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: file.to_string(),
                reason: "File has no extension or invalid filename".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| GeoError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GeoError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// csv crate 只接受單一 ASCII 字元作為分隔符
pub fn validate_delimiter(field_name: &str, value: &str) -> Result<u8> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && c != '"' && c != '\n' && c != '\r' => Ok(c as u8),
        _ => Err(GeoError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Delimiter must be a single ASCII character other than a quote or newline"
                .to_string(),
        }),
    }
}

pub fn validate_date_format(field_name: &str, format: &str) -> Result<()> {
    validate_non_empty_string(field_name, format)?;

    let invalid = || GeoError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: format.to_string(),
        reason: "Date format must identify year, month and day".to_string(),
    };

    // 以固定日期做一次往返，確認格式至少包含年月日
    let reference_date = NaiveDate::from_ymd_opt(2021, 3, 17).ok_or_else(invalid)?;
    let mut rendered = String::new();
    write!(rendered, "{}", reference_date.format(format)).map_err(|_| invalid())?;
    match NaiveDate::parse_from_str(&rendered, format) {
        Ok(parsed) if parsed == reference_date => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("sources.political_communities", "data/gde.csv").is_ok());
        assert!(validate_path("sources.political_communities", "").is_err());
        assert!(validate_path("sources.political_communities", "a\0b").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("sources", &["gde.csv", "plz.ZIP"], &["csv", "zip"]).is_ok());
        assert!(validate_file_extensions("sources", &["gde.txt"], &["csv", "zip"]).is_err());
        assert!(validate_file_extensions("sources", &["README"], &["csv", "zip"]).is_err());
    }

    #[test]
    fn test_validate_delimiter() {
        assert_eq!(validate_delimiter("sources.delimiter", ";").unwrap(), b';');
        assert_eq!(validate_delimiter("sources.delimiter", "\t").unwrap(), b'\t');
        assert!(validate_delimiter("sources.delimiter", "").is_err());
        assert!(validate_delimiter("sources.delimiter", ";;").is_err());
        assert!(validate_delimiter("sources.delimiter", "\"").is_err());
    }

    #[test]
    fn test_validate_date_format() {
        assert!(validate_date_format("sources.date_format", "%d.%m.%Y").is_ok());
        assert!(validate_date_format("sources.date_format", "%Y-%m-%d").is_ok());
        assert!(validate_date_format("sources.date_format", "%Y").is_err());
        assert!(validate_date_format("sources.date_format", " ").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        let present = Some("x".to_string());
        let missing: Option<String> = None;
        assert!(validate_required_field("export.path", &present).is_ok());
        assert!(validate_required_field("export.path", &missing).is_err());
    }
}
