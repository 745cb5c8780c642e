use std::sync::Arc;

use relay_logging::{relay_info, relay_warn};
use serde_json::Value;

use crate::{decode_utf8, BlobError, BlobStore, DecodeError, UrlRegistry};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("object body is not json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("field `{field}` missing from url list document")]
    MissingField { field: String },
    #[error("field `{field}` is not a list of strings")]
    NotStringList { field: String },
}

/// Reads the seed URL list from a blob store object shaped like `{ "<field>": ["...", ...] }`.
pub struct UrlSourceLoader {
    store: Arc<dyn BlobStore>,
    field: String,
}

impl UrlSourceLoader {
    pub fn new(store: Arc<dyn BlobStore>, field: impl Into<String>) -> Self {
        Self {
            store,
            field: field.into(),
        }
    }

    pub async fn load(&self, bucket: &str, key: &str) -> Result<Vec<String>, LoadError> {
        let body = self.store.get_object(bucket, key).await?;
        let text = decode_utf8(&body)?;
        let document: Value = serde_json::from_str(&text)?;
        extract_url_list(&document, &self.field)
    }

    /// Load and publish into `registry`. On failure the registry keeps its current value.
    pub async fn refresh(
        &self,
        bucket: &str,
        key: &str,
        registry: &UrlRegistry,
    ) -> Result<usize, LoadError> {
        match self.load(bucket, key).await {
            Ok(urls) => {
                let count = urls.len();
                registry.set(urls);
                relay_info!("Loaded {} urls from {}/{}", count, bucket, key);
                Ok(count)
            }
            Err(err) => {
                relay_warn!(
                    "Failed to load urls from {}/{}: {}; keeping {} existing urls",
                    bucket,
                    key,
                    err,
                    registry.len()
                );
                Err(err)
            }
        }
    }
}

pub fn extract_url_list(document: &Value, field: &str) -> Result<Vec<String>, LoadError> {
    let list = document
        .get(field)
        .ok_or_else(|| LoadError::MissingField {
            field: field.to_string(),
        })?
        .as_array()
        .ok_or_else(|| LoadError::NotStringList {
            field: field.to_string(),
        })?;

    list.iter()
        .map(|item| {
            item.as_str()
                .map(ToOwned::to_owned)
                .ok_or_else(|| LoadError::NotStringList {
                    field: field.to_string(),
                })
        })
        .collect()
}
