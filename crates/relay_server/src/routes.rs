//! HTTP API and real-time endpoint handlers.

use std::collections::HashMap;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{future, SinkExt, StreamExt};
use relay_core::EvaluationOutcome;
use relay_logging::relay_info;
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;

use crate::app::AppState;
use crate::error::{handle_panic, ApiError};
use crate::session::Inbound;

/// Request/response API served on the HTTP port.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/api/accessibility/evaluate", post(evaluate))
        .route("/api/accessibility/evaluatejson", get(evaluate_json))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(CorsLayer::permissive())
}

/// Real-time channel served on the WebSocket port.
pub fn realtime_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(realtime))
        .route("/ws", get(realtime))
        .with_state(state)
        .layer(middleware::from_fn(log_requests))
}

async fn welcome() -> Json<Value> {
    Json(json!({ "message": "Welcome to the API" }))
}

#[derive(Debug, Default, Deserialize)]
struct EvaluateRequest {
    #[serde(default)]
    url: Option<String>,
}

// Missing, empty or malformed bodies all count as "no URL".
async fn evaluate(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>, ApiError> {
    let request: EvaluateRequest = serde_json::from_slice(&body).unwrap_or_default();
    let url = request
        .url
        .filter(|url| !url.trim().is_empty())
        .ok_or(ApiError::MissingUrl)?;

    match state.evaluator().evaluate(&url, state.evaluate_report_type()).await {
        EvaluationOutcome::Success(payload) => Ok(Json(payload)),
        EvaluationOutcome::Failure(reason) => Err(ApiError::Upstream(reason)),
    }
}

async fn evaluate_json(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let url = params
        .get("url")
        .filter(|url| !url.trim().is_empty())
        .ok_or(ApiError::MissingUrl)?;

    state
        .passthrough()
        .fetch(url)
        .await
        .map(Json)
        .map_err(|err| ApiError::Upstream(err.to_string()))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn log_requests(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let response = next.run(request).await;

    relay_info!(
        "{} {} {} - {} ms",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}

async fn realtime(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (sink, stream) = socket.split();

    let outbound =
        sink.with(|text: String| future::ready(Ok::<_, axum::Error>(Message::Text(text.into()))));
    let inbound = stream.filter_map(|frame| {
        future::ready(match frame {
            Ok(Message::Text(text)) => Some(Inbound::Text(text.as_str().to_owned())),
            Ok(Message::Binary(bytes)) => {
                Some(Inbound::Text(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Ok(Message::Close(_)) => Some(Inbound::Closed),
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => None,
            Err(err) => Some(Inbound::Error(err.to_string())),
        })
    });

    state
        .new_session()
        .run(Box::pin(inbound), Box::pin(outbound))
        .await;
}
