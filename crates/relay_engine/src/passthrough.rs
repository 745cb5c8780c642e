use std::time::Duration;

use relay_logging::relay_debug;
use url::Url;
use serde_json::Value;

use crate::http;
use crate::{FailureKind, FetchError};

/// Fetches an arbitrary URL and hands back its JSON body untouched, error statuses included.
#[derive(Debug, Clone)]
pub struct JsonPassthrough {
    client: reqwest::Client,
    max_bytes: u64,
}

impl JsonPassthrough {
    pub fn new(request_timeout: Duration, max_bytes: u64) -> Result<Self, FetchError> {
        let client = http::build_client(request_timeout, request_timeout)?;
        Ok(Self { client, max_bytes })
    }

    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let parsed =
            Url::parse(url).map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        relay_debug!("Passthrough fetch url={}", url);
        http::get_json_any_status(&self.client, parsed, self.max_bytes).await
    }
}
