use std::time::Duration;

use futures_util::StreamExt;
use url::Url;
use serde_json::Value;

use crate::{FailureKind, FetchError};

pub(crate) fn build_client(
    connect_timeout: Duration,
    request_timeout: Duration,
) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
}

/// GET `url` and return the body, failing on non-2xx status or more than `max_bytes`.
pub(crate) async fn get_bytes(
    client: &reqwest::Client,
    url: Url,
    max_bytes: u64,
) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await.map_err(map_reqwest_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(status_error(status));
    }

    read_body(response, max_bytes).await
}

pub(crate) async fn get_json(
    client: &reqwest::Client,
    url: Url,
    max_bytes: u64,
) -> Result<Value, FetchError> {
    let bytes = get_bytes(client, url, max_bytes).await?;
    parse_json(&bytes)
}

/// GET `url` and return its JSON body whatever the status code.
///
/// A non-2xx answer whose body is not JSON reports the status instead of a parse error.
pub(crate) async fn get_json_any_status(
    client: &reqwest::Client,
    url: Url,
    max_bytes: u64,
) -> Result<Value, FetchError> {
    let response = client.get(url).send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    let bytes = read_body(response, max_bytes).await?;

    match parse_json(&bytes) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Err(status_error(status)),
        Err(err) => Err(err),
    }
}

async fn read_body(response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(too_large(max_bytes, content_len));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(too_large(max_bytes, next_len));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

fn parse_json(bytes: &[u8]) -> Result<Value, FetchError> {
    serde_json::from_slice(bytes).map_err(|err| FetchError::new(FailureKind::Parse, err.to_string()))
}

fn status_error(status: reqwest::StatusCode) -> FetchError {
    FetchError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
}

fn too_large(max_bytes: u64, actual: u64) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

// Request URLs may carry credentials in the query, so they are stripped from messages.
fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else {
        FailureKind::Network
    };
    FetchError::new(kind, err.without_url().to_string())
}
