//! Process configuration, read once from the environment at startup.
//!
//! An optional `.env` file in the working directory is loaded first; values
//! already present in the environment win over the file.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use relay_core::ReportType;
use relay_engine::{EvaluationSettings, FanOutSettings};
use thiserror::Error;

use crate::bootstrap::UrlSource;
use crate::session::SessionSettings;

pub const DEFAULT_HTTP_PORT: u16 = 3000;
pub const DEFAULT_WS_PORT: u16 = 8080;
pub const DEFAULT_BLOB_ENDPOINT: &str = "https://s3.us-east-2.amazonaws.com";
pub const DEFAULT_OBJECT_KEY: &str = "data.json";
pub const DEFAULT_LIST_FIELD: &str = "names";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read .env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub evaluation: EvaluationSettings,
    pub fan_out: FanOutSettings,
    /// Report level for the single-URL evaluate endpoint.
    pub evaluate_report_type: ReportType,
    /// `None` when no bucket is configured; the working set then stays empty.
    pub url_source: Option<UrlSource>,
    pub blob_endpoint: String,
    pub http_port: u16,
    pub ws_port: u16,
    pub session: SessionSettings,
    pub log: LogSettings,
}

impl RelayConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(dotenvy::Error::Io(_)) => {}
            Err(err) => return Err(err.into()),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = EvaluationSettings::default();
        let evaluation = EvaluationSettings {
            endpoint: get("WAVE_API_URL"),
            api_key: get("WAVE_API_KEY"),
            connect_timeout: parse_millis(&get, "EVAL_CONNECT_TIMEOUT_MS")?
                .unwrap_or(defaults.connect_timeout),
            request_timeout: parse_millis(&get, "EVAL_REQUEST_TIMEOUT_MS")?
                .unwrap_or(defaults.request_timeout),
            max_bytes: defaults.max_bytes,
        };

        let fan_out = FanOutSettings {
            report_type: parse::<u8>(&get, "REPORT_TYPE")?
                .map(ReportType)
                .unwrap_or_default(),
            // Zero means no limit.
            max_concurrency: parse::<usize>(&get, "FAN_OUT_CONCURRENCY")?.and_then(NonZeroUsize::new),
        };

        let evaluate_report_type = parse::<u8>(&get, "EVALUATE_REPORT_TYPE")?
            .map(ReportType)
            .unwrap_or_default();

        let url_source = get("URL_BUCKET").map(|bucket| UrlSource {
            bucket,
            key: get("URL_OBJECT_KEY").unwrap_or_else(|| DEFAULT_OBJECT_KEY.to_string()),
            field: get("URL_LIST_FIELD").unwrap_or_else(|| DEFAULT_LIST_FIELD.to_string()),
        });

        let session_defaults = SessionSettings::default();
        let session = SessionSettings {
            follow_up_delay: parse_millis(&get, "FOLLOW_UP_DELAY_MS")?
                .unwrap_or(session_defaults.follow_up_delay),
            follow_up_message: get("FOLLOW_UP_MESSAGE")
                .unwrap_or(session_defaults.follow_up_message),
        };

        let level = match get("RELAY_LOG_LEVEL") {
            Some(raw) => relay_logging::level_from_str(&raw).ok_or_else(|| ConfigError::Invalid {
                var: "RELAY_LOG_LEVEL",
                value: raw.clone(),
                reason: "expected off, error, warn, info, debug or trace".into(),
            })?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            evaluation,
            fan_out,
            evaluate_report_type,
            url_source,
            blob_endpoint: get("BLOB_ENDPOINT").unwrap_or_else(|| DEFAULT_BLOB_ENDPOINT.to_string()),
            http_port: parse(&get, "HTTP_PORT")?.unwrap_or(DEFAULT_HTTP_PORT),
            ws_port: parse(&get, "WS_PORT")?.unwrap_or(DEFAULT_WS_PORT),
            session,
            log: LogSettings {
                level,
                file: get("RELAY_LOG_FILE").map(PathBuf::from),
            },
        })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(var)
        .map(|raw| {
            raw.parse::<T>().map_err(|err| ConfigError::Invalid {
                var,
                value: raw.clone(),
                reason: err.to_string(),
            })
        })
        .transpose()
}

fn parse_millis(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<Duration>, ConfigError> {
    Ok(parse::<u64>(get, var)?.map(Duration::from_millis))
}
