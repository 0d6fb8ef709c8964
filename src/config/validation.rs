use crate::config::types::{Config, JobConfig, SourceConfig, StorageConfig};
use crate::ConfigError;
use chrono::NaiveDate;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_job_config(&config.job)?;
    validate_source_config(&config.source)?;
    validate_storage_config(&config.storage)?;
    Ok(())
}

/// Validates job scoping configuration
fn validate_job_config(config: &JobConfig) -> Result<(), ConfigError> {
    if let Some(run_date) = &config.run_date {
        validate_run_date(run_date)?;
    }

    if config.files_per_run < 1 {
        return Err(ConfigError::Validation(format!(
            "files_per_run must be >= 1, got {}",
            config.files_per_run
        )));
    }

    Ok(())
}

/// Validates a run date string (YYYYMMDD)
pub fn validate_run_date(run_date: &str) -> Result<(), ConfigError> {
    if NaiveDate::parse_from_str(run_date, "%Y%m%d").is_err() {
        return Err(ConfigError::InvalidRunDate(format!(
            "'{}' is not a YYYYMMDD date",
            run_date
        )));
    }
    Ok(())
}

/// Validates archive source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.base_url, "base_url")?;

    if let Some(unloading_url) = &config.unloading_url {
        validate_http_url(unloading_url, "unloading_url")?;
    }

    if config.manifest.is_none() && config.unloading_url.is_none() {
        return Err(ConfigError::Validation(
            "either source.manifest or source.unloading-url must be set".to_string(),
        ));
    }

    if let Some(manifest) = &config.manifest {
        if manifest.is_empty() {
            return Err(ConfigError::Validation(
                "source.manifest cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates working directory configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    for (name, dir) in [
        ("source_dir", &config.source_dir),
        ("extracted_dir", &config.extracted_dir),
        ("destination_dir", &config.destination_dir),
        ("statistics_dir", &config.statistics_dir),
    ] {
        if dir.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }
    Ok(())
}

/// Validates that a string is a well-formed http(s) URL
fn validate_http_url(value: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field,
            url.scheme()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            job: JobConfig {
                run_date: Some("20230402".to_string()),
                files_per_run: 1,
            },
            source: SourceConfig {
                base_url: "https://data.commoncrawl.org/".to_string(),
                manifest: Some("robotstxt.paths.gz".to_string()),
                unloading_url: None,
            },
            storage: StorageConfig {
                source_dir: "data/source".to_string(),
                extracted_dir: "data/extracted".to_string(),
                destination_dir: "data/destination".to_string(),
                statistics_dir: "data/statistics".to_string(),
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_run_date_format() {
        assert!(validate_run_date("20230402").is_ok());

        assert!(validate_run_date("2023-04-02").is_err());
        assert!(validate_run_date("20231302").is_err());
        assert!(validate_run_date("yesterday").is_err());
        assert!(validate_run_date("").is_err());
    }

    #[test]
    fn test_zero_files_per_run_rejected() {
        let mut config = valid_config();
        config.job.files_per_run = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let mut config = valid_config();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));

        config.source.base_url = "ftp://data.commoncrawl.org/".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_manifest_or_unloading_url_required() {
        let mut config = valid_config();
        config.source.manifest = None;
        config.source.unloading_url = None;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));

        config.source.unloading_url =
            Some("https://data.commoncrawl.org/seg-00799.warc.gz".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_dir_rejected() {
        let mut config = valid_config();
        config.storage.statistics_dir = String::new();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }
}
