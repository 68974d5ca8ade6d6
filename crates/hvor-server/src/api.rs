//! HTTP API.
//!
//! Routes:
//! - `GET /?from=<token>`: landing data, gated by an access token
//! - `GET /past?from=<n>&to=<m>`: a window of the past bucket
//! - `GET /future?from=<n>&to=<m>`: a window of the future bucket
//! - `GET /health`: liveness and refresh status
//!
//! Everything is JSON; errors are plain text with a status code.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::debug;

use hvor_core::{Bucket, Event, Page, Window, WindowError};

use crate::scheduler::{SchedulerState, SharedSchedulerState};
use crate::snapshot::{Snapshot, SnapshotStore};
use crate::tokens::AccessTokens;

/// Body of a 401 on the landing page.
pub const UNAUTHORISED: &str = "Unauthorised, you probably do not have a direct link";

const NOT_READY: &str = "calendar not loaded yet";

type ApiResult = Result<Response, (StatusCode, String)>;

/// State shared by all handlers.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub store: SnapshotStore,
    pub tokens: Arc<AccessTokens>,
    /// Refresh status reported by `/health`, when a scheduler runs.
    pub scheduler: Option<SharedSchedulerState>,
}

impl ApiState {
    pub fn new(store: SnapshotStore, tokens: AccessTokens) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            scheduler: None,
        }
    }

    #[must_use]
    pub fn with_scheduler(mut self, state: SharedSchedulerState) -> Self {
        self.scheduler = Some(state);
        self
    }

    fn snapshot(&self) -> Result<Arc<Snapshot>, (StatusCode, String)> {
        self.store
            .current()
            .ok_or_else(|| (StatusCode::SERVICE_UNAVAILABLE, NOT_READY.to_string()))
    }
}

/// Builds the router with all routes.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/past", get(past))
        .route("/future", get(future))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Landing data: when the page was fetched, where I am, what is next and
/// what came before.
#[derive(Debug, Serialize)]
pub struct IndexView<'a> {
    pub last_updated: DateTime<Utc>,
    pub current: Option<&'a Event>,
    pub future: Window<'a>,
    pub past: Window<'a>,
}

impl<'a> IndexView<'a> {
    pub fn new(page: &'a Page, last_updated: DateTime<Utc>) -> Result<Self, WindowError> {
        Ok(Self {
            last_updated,
            current: page.current.as_ref(),
            future: page.first_window(Bucket::Future)?,
            past: page.first_window(Bucket::Past)?,
        })
    }
}

#[derive(Debug, Serialize)]
struct HealthView {
    /// `degraded` while the latest refreshes fail and an older page is served.
    status: &'static str,
    last_updated: Option<DateTime<Utc>>,
    scheduler: Option<SchedulerState>,
}

async fn index(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let authorised = params
        .get("from")
        .is_some_and(|token| state.tokens.is_valid(token));
    if !authorised {
        debug!("Rejected landing request without a valid token");
        return Err((StatusCode::UNAUTHORIZED, UNAUTHORISED.to_string()));
    }

    let snapshot = state.snapshot()?;
    let view = IndexView::new(&snapshot.page, snapshot.fetched_at)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok(Json(view).into_response())
}

async fn past(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    bucket_window(&state, Bucket::Past, &params)
}

async fn future(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    bucket_window(&state, Bucket::Future, &params)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let scheduler = match &state.scheduler {
        Some(shared) => Some(shared.read().await.clone()),
        None => None,
    };
    let failing = scheduler
        .as_ref()
        .is_some_and(|s| s.consecutive_failures > 0);

    Json(HealthView {
        status: if failing { "degraded" } else { "ok" },
        last_updated: state.store.current().map(|s| s.fetched_at),
        scheduler,
    })
}

fn bucket_window(state: &ApiState, bucket: Bucket, params: &HashMap<String, String>) -> ApiResult {
    let from = bound(params, "from")?;
    let to = bound(params, "to")?;

    let snapshot = state.snapshot()?;
    let window = snapshot
        .page
        .window(bucket, from, to)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(window).into_response())
}

fn bound(params: &HashMap<String, String>, name: &str) -> Result<i64, (StatusCode, String)> {
    params
        .get(name)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| (StatusCode::BAD_REQUEST, format!("invalid {name}")))
}
