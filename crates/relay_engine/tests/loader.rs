use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use relay_engine::{
    BlobError, BlobStore, HttpBlobStore, LoadError, MemoryBlobStore, UrlRegistry, UrlSourceLoader,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUCKET: &str = "a11y-urls";
const KEY: &str = "data.json";

fn seeded_registry() -> UrlRegistry {
    UrlRegistry::new(vec!["https://seed.example".into()])
}

#[tokio::test]
async fn refresh_replaces_working_set_on_success() {
    relay_logging::initialize_for_tests();
    let store = MemoryBlobStore::new();
    store.insert(
        BUCKET,
        KEY,
        r#"{"names": ["https://a.example", "https://b.example"], "other": 1}"#,
    );
    let loader = UrlSourceLoader::new(Arc::new(store), "names");
    let registry = seeded_registry();

    let count = loader.refresh(BUCKET, KEY, &registry).await.expect("loaded");

    assert_eq!(count, 2);
    assert_eq!(
        registry.get().to_vec(),
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
}

#[tokio::test]
async fn missing_object_keeps_previous_working_set() {
    let loader = UrlSourceLoader::new(Arc::new(MemoryBlobStore::new()), "names");
    let registry = seeded_registry();

    let err = loader.refresh(BUCKET, KEY, &registry).await.unwrap_err();

    assert!(matches!(err, LoadError::Blob(BlobError::NotFound { .. })));
    assert_eq!(registry.get().to_vec(), vec!["https://seed.example".to_string()]);
}

#[tokio::test]
async fn invalid_documents_keep_previous_working_set() {
    let cases: [(&[u8], fn(&LoadError) -> bool); 4] = [
        (b"not json", |e| matches!(e, LoadError::Json(_))),
        (b"{\xFF}", |e| matches!(e, LoadError::Decode(_))),
        (br#"{"urls": []}"#, |e| matches!(e, LoadError::MissingField { .. })),
        (br#"{"names": [1, 2]}"#, |e| matches!(e, LoadError::NotStringList { .. })),
    ];

    for (body, expected) in cases {
        let store = MemoryBlobStore::new();
        store.insert(BUCKET, KEY, Bytes::copy_from_slice(body));
        let loader = UrlSourceLoader::new(Arc::new(store), "names");
        let registry = seeded_registry();

        let err = loader.refresh(BUCKET, KEY, &registry).await.unwrap_err();

        assert!(expected(&err), "unexpected error {err}");
        assert_eq!(registry.len(), 1);
    }
}

struct UnreachableStore;

#[async_trait::async_trait]
impl BlobStore for UnreachableStore {
    async fn get_object(&self, _bucket: &str, _key: &str) -> Result<Bytes, BlobError> {
        let err = HttpBlobStore::new("http://127.0.0.1:9", Duration::from_millis(200), 64)
            .expect("store")
            .get_object("b", "k")
            .await
            .unwrap_err();
        Err(err)
    }
}

#[tokio::test]
async fn unreachable_store_is_not_fatal() {
    let loader = UrlSourceLoader::new(Arc::new(UnreachableStore), "names");
    let registry = UrlRegistry::default();

    let err = loader.refresh(BUCKET, KEY, &registry).await.unwrap_err();

    assert!(matches!(err, LoadError::Blob(BlobError::Unreachable(_))));
    assert!(registry.is_empty());
}

#[tokio::test]
async fn http_store_reads_object_by_bucket_and_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a11y-urls/lists/data.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"names": ["https://c.example"]}"#))
        .mount(&server)
        .await;

    let store = HttpBlobStore::new(&server.uri(), Duration::from_secs(5), 1024).expect("store");
    let loader = UrlSourceLoader::new(Arc::new(store), "names");

    let urls = loader.load(BUCKET, "lists/data.json").await.expect("loaded");
    assert_eq!(urls, vec!["https://c.example".to_string()]);
}

#[tokio::test]
async fn http_store_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = HttpBlobStore::new(&server.uri(), Duration::from_secs(5), 1024).expect("store");
    let err = store.get_object(BUCKET, KEY).await.unwrap_err();

    assert_eq!(
        err,
        BlobError::NotFound {
            bucket: BUCKET.to_string(),
            key: KEY.to_string()
        }
    );
}

#[tokio::test]
async fn http_store_maps_denied_access_to_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = HttpBlobStore::new(&server.uri(), Duration::from_secs(5), 1024).expect("store");
    let err = store.get_object(BUCKET, KEY).await.unwrap_err();

    assert!(matches!(err, BlobError::Unreachable(fetch) if fetch.kind.is_transport()));
}
