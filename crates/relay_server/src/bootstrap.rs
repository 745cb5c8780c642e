//! One-shot startup load of the working set from the object store.

use std::sync::Arc;

use relay_engine::{BlobStore, UrlRegistry, UrlSourceLoader};
use relay_logging::{relay_error, relay_info, relay_warn};
use tokio::task::JoinHandle;

/// Location of the seed URL list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSource {
    pub bucket: String,
    pub key: String,
    /// JSON field holding the list of URLs.
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Loaded(usize),
    Failed(String),
    /// No source configured.
    Skipped,
}

/// Handle to the background load. Awaiting it never fails.
#[derive(Debug)]
pub struct Bootstrap {
    handle: JoinHandle<BootstrapOutcome>,
}

impl Bootstrap {
    /// Start loading in the background. The registry is only written on success.
    pub fn spawn(
        store: Arc<dyn BlobStore>,
        source: Option<UrlSource>,
        registry: Arc<UrlRegistry>,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let Some(source) = source else {
                relay_warn!("No URL_BUCKET configured; working set stays empty");
                return BootstrapOutcome::Skipped;
            };
            let loader = UrlSourceLoader::new(store, source.field.clone());
            match loader.refresh(&source.bucket, &source.key, &registry).await {
                Ok(count) => BootstrapOutcome::Loaded(count),
                Err(err) => BootstrapOutcome::Failed(err.to_string()),
            }
        });
        Self { handle }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> BootstrapOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) => BootstrapOutcome::Failed(format!("bootstrap task aborted: {err}")),
        }
    }

    /// Log the outcome once the load settles.
    pub fn supervise(self) -> JoinHandle<BootstrapOutcome> {
        tokio::spawn(async move {
            let outcome = self.wait().await;
            match &outcome {
                BootstrapOutcome::Loaded(count) => {
                    relay_info!("Bootstrap complete: {} urls in working set", count)
                }
                BootstrapOutcome::Failed(reason) => {
                    relay_error!("Bootstrap failed, continuing with previous working set: {}", reason)
                }
                BootstrapOutcome::Skipped => relay_info!("Bootstrap skipped"),
            }
            outcome
        })
    }
}
