use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use relay_core::ReportType;
use relay_engine::{
    Evaluator, FanOutEvaluator, FanOutSettings, FetchError, HttpBlobStore, JsonPassthrough,
    ReqwestEvaluator, UrlRegistry,
};
use relay_logging::{relay_error, relay_info};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::routes::{api_router, realtime_router};
use crate::session::{RealtimeSession, SessionId, SessionSettings};

const PASSTHROUGH_MAX_BYTES: u64 = 10 * 1024 * 1024;
const BLOB_MAX_BYTES: u64 = 4 * 1024 * 1024;

/// Shared state handed to every handler and session.
#[derive(Clone)]
pub struct AppState {
    registry: Arc<UrlRegistry>,
    evaluator: Arc<dyn Evaluator>,
    fan_out: Arc<FanOutEvaluator>,
    passthrough: Arc<JsonPassthrough>,
    evaluate_report_type: ReportType,
    session: SessionSettings,
    next_session_id: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(
        registry: Arc<UrlRegistry>,
        evaluator: Arc<dyn Evaluator>,
        passthrough: JsonPassthrough,
        fan_out: FanOutSettings,
        evaluate_report_type: ReportType,
        session: SessionSettings,
    ) -> Self {
        Self {
            fan_out: Arc::new(FanOutEvaluator::new(Arc::clone(&evaluator), fan_out)),
            registry,
            evaluator,
            passthrough: Arc::new(passthrough),
            evaluate_report_type,
            session,
            next_session_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn from_config(config: &RelayConfig, registry: Arc<UrlRegistry>) -> Result<Self, FetchError> {
        let evaluator = ReqwestEvaluator::new(config.evaluation.clone())?;
        let passthrough = JsonPassthrough::new(config.evaluation.request_timeout, PASSTHROUGH_MAX_BYTES)?;
        Ok(Self::new(
            registry,
            Arc::new(evaluator),
            passthrough,
            config.fan_out,
            config.evaluate_report_type,
            config.session.clone(),
        ))
    }

    pub fn registry(&self) -> &Arc<UrlRegistry> {
        &self.registry
    }

    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    pub fn passthrough(&self) -> &JsonPassthrough {
        &self.passthrough
    }

    pub fn evaluate_report_type(&self) -> ReportType {
        self.evaluate_report_type
    }

    pub fn new_session(&self) -> RealtimeSession {
        let id: SessionId = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        RealtimeSession::new(
            id,
            Arc::clone(&self.registry),
            Arc::clone(&self.fan_out),
            self.session.clone(),
        )
    }
}

/// Object store client for the configured endpoint.
pub fn blob_store(config: &RelayConfig) -> Result<HttpBlobStore, FetchError> {
    HttpBlobStore::new(
        &config.blob_endpoint,
        Duration::from_secs(30),
        BLOB_MAX_BYTES,
    )
}

/// Both listeners, running until [`ServerHandle::shutdown`].
pub struct ServerHandle {
    pub http_addr: SocketAddr,
    pub ws_addr: SocketAddr,
    shutdown: CancellationToken,
    http: JoinHandle<()>,
    realtime: JoinHandle<()>,
}

impl ServerHandle {
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.http.await;
        let _ = self.realtime.await;
    }
}

/// Bind the HTTP API and real-time listeners. Port 0 picks a free port.
pub async fn start(state: AppState, http_port: u16, ws_port: u16) -> std::io::Result<ServerHandle> {
    let http_listener = TcpListener::bind(("0.0.0.0", http_port)).await?;
    let ws_listener = TcpListener::bind(("0.0.0.0", ws_port)).await?;
    let http_addr = http_listener.local_addr()?;
    let ws_addr = ws_listener.local_addr()?;
    let shutdown = CancellationToken::new();

    let http = spawn_listener("http", http_listener, api_router(state.clone()), shutdown.clone());
    let realtime = spawn_listener("realtime", ws_listener, realtime_router(state), shutdown.clone());

    relay_info!(
        "Server running at http://localhost:{}, real-time channel at ws://localhost:{}",
        http_addr.port(),
        ws_addr.port()
    );

    Ok(ServerHandle {
        http_addr,
        ws_addr,
        shutdown,
        http,
        realtime,
    })
}

fn spawn_listener(
    name: &'static str,
    listener: TcpListener,
    router: axum::Router,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.cancelled_owned())
            .await
        {
            relay_error!("{} listener stopped: {}", name, err);
        }
    })
}
