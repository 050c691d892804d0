//! HTTP surface: JSON endpoints plus the static frontend.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, State};
use axum::routing::{get, post};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use types::{LeaderboardEntry, LogAck, ScoreReceipt, StartRequest, StartResponse, SubmitRequest};

use crate::clock::Clock;
use crate::config::ServiceConfig;
use crate::crypto::ScoreSigner;
use crate::error::Rejection;
use crate::logging::FRONTEND_TARGET;
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::service::ScoreService;

/// Shared state behind every handler.
pub struct AppState {
    pub service: ScoreService,
    pub leaders_limiter: RateLimiter,
}

impl AppState {
    /// Wires the service and the `/leaders` limiter onto one clock.
    pub fn new(
        service: &ServiceConfig,
        leaders_rate_limit: RateLimitConfig,
        signer: ScoreSigner,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            service: ScoreService::new(service, signer, clock.clone()),
            leaders_limiter: RateLimiter::new(leaders_rate_limit, clock),
        }
    }
}

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .route("/start", post(start_session))
        .route("/submit", post(submit_score))
        .route("/leaders", get(get_leaders))
        .route("/api/log-error", post(log_frontend_error))
        .route("/health", get(health_check))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    body: Result<Json<StartRequest>, JsonRejection>,
) -> Result<Json<StartResponse>, Rejection> {
    let Json(request) = body?;
    let session_id = state.service.start_session(request.name);
    Ok(Json(StartResponse { session_id }))
}

async fn submit_score(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<ScoreReceipt>, Rejection> {
    let Json(request) = body?;
    state.service.submit(&request).map(Json)
}

async fn get_leaders(
    State(state): State<Arc<AppState>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
) -> Result<Json<Vec<LeaderboardEntry>>, Rejection> {
    // Requests without a peer address (in-process callers) share one bucket.
    let client = connect_info
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));

    if !state.leaders_limiter.check(client) {
        tracing::debug!(%client, "Leaderboard rate limit hit");
        return Err(Rejection::RateLimited);
    }

    Ok(Json(state.service.leaders().as_ref().clone()))
}

async fn log_frontend_error(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<LogAck>, Rejection> {
    let Json(report) = body?;
    tracing::error!(target: FRONTEND_TARGET, "Frontend error: {}", report);
    Ok(Json(LogAck::logged()))
}

async fn health_check() -> &'static str {
    "OK"
}
