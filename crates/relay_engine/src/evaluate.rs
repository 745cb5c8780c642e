use std::fmt;
use std::time::Duration;

use relay_core::{EvaluationOutcome, ReportType};
use relay_logging::{relay_debug, relay_warn};
use url::Url;
use serde_json::Value;

use crate::http;
use crate::{FailureKind, FetchError};

#[derive(Clone)]
pub struct EvaluationSettings {
    /// Base URL of the accessibility evaluation API.
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

impl fmt::Debug for EvaluationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_bytes", &self.max_bytes)
            .finish()
    }
}

/// Evaluates one page. Implementations never fail: every error becomes
/// [`EvaluationOutcome::Failure`].
#[async_trait::async_trait]
pub trait Evaluator: Send + Sync {
    async fn evaluate(&self, url: &str, report_type: ReportType) -> EvaluationOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestEvaluator {
    settings: EvaluationSettings,
    client: reqwest::Client,
}

impl ReqwestEvaluator {
    pub fn new(settings: EvaluationSettings) -> Result<Self, FetchError> {
        let client = http::build_client(settings.connect_timeout, settings.request_timeout)?;
        Ok(Self { settings, client })
    }

    fn request_url(&self, url: &str, report_type: ReportType) -> Result<Url, FetchError> {
        let endpoint = self.settings.endpoint.as_deref().ok_or_else(|| {
            FetchError::new(FailureKind::ConfigurationMissing, "evaluation endpoint not set")
        })?;
        let api_key = self.settings.api_key.as_deref().ok_or_else(|| {
            FetchError::new(FailureKind::ConfigurationMissing, "evaluation api key not set")
        })?;
        let report_type = report_type.to_string();
        Url::parse_with_params(
            endpoint,
            &[
                ("key", api_key),
                ("url", url),
                ("reporttype", report_type.as_str()),
            ],
        )
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn try_evaluate(&self, url: &str, report_type: ReportType) -> Result<Value, FetchError> {
        let request_url = self.request_url(url, report_type)?;
        relay_debug!("Evaluating url={} reporttype={}", url, report_type);
        http::get_json(&self.client, request_url, self.settings.max_bytes).await
    }
}

#[async_trait::async_trait]
impl Evaluator for ReqwestEvaluator {
    async fn evaluate(&self, url: &str, report_type: ReportType) -> EvaluationOutcome {
        match self.try_evaluate(url, report_type).await {
            Ok(payload) => EvaluationOutcome::Success(payload),
            Err(err) => {
                relay_warn!("Evaluation of {} failed: {}", url, err);
                EvaluationOutcome::Failure(err.to_string())
            }
        }
    }
}
