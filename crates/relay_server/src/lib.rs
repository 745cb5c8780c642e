//! Relay server: configuration, bootstrap, HTTP routes and real-time sessions.
pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod session;

pub use app::{blob_store, start, AppState, ServerHandle};
pub use bootstrap::{Bootstrap, BootstrapOutcome, UrlSource};
pub use config::{ConfigError, RelayConfig};
pub use error::ApiError;
pub use session::{Inbound, RealtimeSession, SessionSettings};
