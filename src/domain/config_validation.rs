//! Report configuration and its validation.
//!
//! Every value has a default, so an absent config file still yields a usable
//! [`ReportConfig`]: the 2018-2022 window on the main `Tinkoff` brokerage
//! account against the production API.

use crate::domain::error::ReporterError;
use crate::ports::config_port::ConfigPort;
use chrono::{DateTime, FixedOffset, NaiveDate};

pub const DEFAULT_START_DATE: &str = "2018-01-01T00:00:00Z";
pub const DEFAULT_END_DATE: &str = "2022-01-01T00:00:00Z";
pub const DEFAULT_ACCOUNT_TYPE: &str = "Tinkoff";
pub const PRODUCTION_URL: &str = "https://api-invest.tinkoff.ru/openapi";
pub const SANDBOX_URL: &str = "https://api-invest.tinkoff.ru/openapi/sandbox";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub sandbox: bool,
    pub timeout_secs: u64,
}

impl ApiConfig {
    /// Explicit `base_url` wins over the sandbox switch.
    pub fn endpoint(&self) -> &str {
        match &self.base_url {
            Some(url) => url.as_str(),
            None if self.sandbox => SANDBOX_URL,
            None => PRODUCTION_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub start_date: DateTime<FixedOffset>,
    pub end_date: DateTime<FixedOffset>,
    pub account_type: String,
    pub api: ApiConfig,
    pub log_level: String,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides<'a> {
    pub start_date: Option<&'a str>,
    pub end_date: Option<&'a str>,
    pub account_type: Option<&'a str>,
    pub sandbox: bool,
}

pub fn build_report_config(config: &dyn ConfigPort) -> Result<ReportConfig, ReporterError> {
    build_report_config_with(config, &ConfigOverrides::default())
}

pub fn build_report_config_with(
    config: &dyn ConfigPort,
    overrides: &ConfigOverrides<'_>,
) -> Result<ReportConfig, ReporterError> {
    let start_str = overrides
        .start_date
        .map(str::to_string)
        .or_else(|| config.get_string("report", "start_date"))
        .unwrap_or_else(|| DEFAULT_START_DATE.to_string());
    let end_str = overrides
        .end_date
        .map(str::to_string)
        .or_else(|| config.get_string("report", "end_date"))
        .unwrap_or_else(|| DEFAULT_END_DATE.to_string());

    let start_date = parse_datetime(&start_str, "start_date")?;
    let end_date = parse_datetime(&end_str, "end_date")?;
    validate_window(start_date, end_date)?;

    let account_type = overrides
        .account_type
        .map(str::to_string)
        .or_else(|| config.get_string("report", "account_type"))
        .unwrap_or_else(|| DEFAULT_ACCOUNT_TYPE.to_string());
    validate_account_type(&account_type)?;

    let api = ApiConfig {
        base_url: config
            .get_string("api", "base_url")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty()),
        sandbox: overrides.sandbox || config.get_bool("api", "sandbox", false),
        timeout_secs: parse_timeout(config.get_string("api", "timeout_secs").as_deref())?,
    };

    let log_level = log_level(config)?;

    Ok(ReportConfig {
        start_date,
        end_date,
        account_type: account_type.trim().to_string(),
        api,
        log_level,
    })
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<FixedOffset>, ReporterError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().fixed_offset())
        .ok_or_else(|| ReporterError::ConfigInvalid {
            section: "report".to_string(),
            key: field.to_string(),
            reason: format!("invalid {field} format, expected RFC 3339 or YYYY-MM-DD"),
        })
}

/// `[logging] level`, lowercased. Blank or absent means `info`.
///
/// Only plain level names are accepted: anything else would be read by
/// `EnvFilter` as a target directive and silence the log report.
pub fn log_level(config: &dyn ConfigPort) -> Result<String, ReporterError> {
    let Some(raw) = config.get_string("logging", "level") else {
        return Ok(DEFAULT_LOG_LEVEL.to_string());
    };
    let level = raw.trim().to_lowercase();
    if level.is_empty() {
        return Ok(DEFAULT_LOG_LEVEL.to_string());
    }
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(ReporterError::ConfigInvalid {
            section: "logging".to_string(),
            key: "level".to_string(),
            reason: format!("unknown level '{raw}', expected one of {}", LOG_LEVELS.join(", ")),
        });
    }
    Ok(level)
}

fn validate_window(
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
) -> Result<(), ReporterError> {
    if start > end {
        return Err(ReporterError::ConfigInvalid {
            section: "report".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must not be after end_date".to_string(),
        });
    }
    Ok(())
}

fn validate_account_type(value: &str) -> Result<(), ReporterError> {
    if value.trim().is_empty() {
        return Err(ReporterError::ConfigMissing {
            section: "report".to_string(),
            key: "account_type".to_string(),
        });
    }
    Ok(())
}

fn parse_timeout(value: Option<&str>) -> Result<u64, ReporterError> {
    let Some(raw) = value else {
        return Ok(DEFAULT_TIMEOUT_SECS);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ReporterError::ConfigInvalid {
            section: "api".to_string(),
            key: "timeout_secs".to_string(),
            reason: "timeout_secs must be a positive integer".to_string(),
        }),
    }
}
