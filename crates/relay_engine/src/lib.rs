//! Relay engine: outbound evaluation calls, URL bootstrap, and concurrent fan-out.
mod blob;
mod decode;
mod evaluate;
mod fanout;
mod http;
mod loader;
mod passthrough;
mod registry;
mod types;

pub use blob::{BlobError, BlobStore, HttpBlobStore, MemoryBlobStore};
pub use decode::{decode_utf8, DecodeError};
pub use evaluate::{EvaluationSettings, Evaluator, ReqwestEvaluator};
pub use fanout::{FanOutEvaluator, FanOutSettings};
pub use loader::{extract_url_list, LoadError, UrlSourceLoader};
pub use passthrough::JsonPassthrough;
pub use registry::UrlRegistry;
pub use types::{FailureKind, FetchError};
