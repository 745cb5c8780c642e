use std::sync::Arc;

use relay_engine::{MemoryBlobStore, UrlRegistry};
use relay_server::{Bootstrap, BootstrapOutcome, UrlSource};

fn source() -> UrlSource {
    UrlSource {
        bucket: "mybucket".into(),
        key: "data.json".into(),
        field: "names".into(),
    }
}

#[tokio::test]
async fn bootstrap_publishes_loaded_urls() {
    relay_logging::initialize_for_tests();
    let store = MemoryBlobStore::new();
    store.insert("mybucket", "data.json", r#"{"names": ["https://a.example", "https://b.example"]}"#);
    let registry = Arc::new(UrlRegistry::default());

    let outcome = Bootstrap::spawn(Arc::new(store), Some(source()), Arc::clone(&registry))
        .supervise()
        .await
        .unwrap();

    assert_eq!(outcome, BootstrapOutcome::Loaded(2));
    assert_eq!(registry.len(), 2);
}

#[tokio::test]
async fn failed_bootstrap_keeps_prior_working_set() {
    let registry = Arc::new(UrlRegistry::new(vec!["https://prior.example".into()]));

    let outcome = Bootstrap::spawn(
        Arc::new(MemoryBlobStore::new()),
        Some(source()),
        Arc::clone(&registry),
    )
    .wait()
    .await;

    assert!(matches!(outcome, BootstrapOutcome::Failed(reason) if reason.contains("not found")));
    assert_eq!(registry.get().to_vec(), vec!["https://prior.example".to_string()]);
}

#[tokio::test]
async fn missing_source_skips_bootstrap() {
    let registry = Arc::new(UrlRegistry::default());

    let outcome = Bootstrap::spawn(Arc::new(MemoryBlobStore::new()), None, Arc::clone(&registry))
        .wait()
        .await;

    assert_eq!(outcome, BootstrapOutcome::Skipped);
    assert!(registry.is_empty());
}
