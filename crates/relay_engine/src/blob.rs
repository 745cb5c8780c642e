use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use bytes::Bytes;
use relay_logging::relay_debug;
use url::Url;

use crate::http;
use crate::{FailureKind, FetchError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlobError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("object store unreachable: {0}")]
    Unreachable(FetchError),
}

/// Read-only access to named objects in a bucketed object store.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, BlobError>;
}

/// Anonymous path-style GET against an S3-compatible endpoint: `{endpoint}/{bucket}/{key}`.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    endpoint: Url,
    client: reqwest::Client,
    max_bytes: u64,
}

impl HttpBlobStore {
    pub fn new(endpoint: &str, request_timeout: Duration, max_bytes: u64) -> Result<Self, FetchError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if endpoint.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{endpoint} cannot hold object paths"),
            ));
        }
        let client = http::build_client(request_timeout, request_timeout)?;
        Ok(Self {
            endpoint,
            client,
            max_bytes,
        })
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(bucket).extend(key.split('/'));
        }
        url
    }
}

#[async_trait::async_trait]
impl BlobStore for HttpBlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, BlobError> {
        let url = self.object_url(bucket, key);
        relay_debug!("Fetching object {}", url);
        match http::get_bytes(&self.client, url, self.max_bytes).await {
            Ok(body) => Ok(Bytes::from(body)),
            Err(err) if err.kind == FailureKind::HttpStatus(404) => Err(BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(err) => Err(BlobError::Unreachable(err)),
        }
    }
}

/// In-process store, used when objects are seeded locally and in tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((bucket.to_string(), key.to_string()), body.into());
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, BlobError> {
        self.objects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }
}
