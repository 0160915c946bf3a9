//! Monitor CRUD and history endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::actors::messages::MonitorSnapshot;
use crate::api::{error::ApiResult, state::ApiState};
use crate::history::HistoryRange;
use crate::probe::ProbeOutcome;

/// Probe interval applied when a create request omits one
const DEFAULT_INTERVAL_MS: u64 = 5000;

#[derive(Debug, Deserialize)]
pub struct CreateMonitorRequest {
    pub host: String,
    pub port: u16,
    /// Probe interval in milliseconds
    pub interval: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMonitorRequest {
    /// New probe interval in milliseconds
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Time window token: 1h, 6h, 24h, 7d. Unknown tokens mean "no filter".
    pub range: Option<String>,
    /// Keep only the most recent N outcomes; 0 means unlimited
    pub limit: Option<usize>,
}

/// GET /api/monitors
///
/// List all monitors with their current statistics
pub async fn list_monitors(State(state): State<ApiState>) -> Json<Vec<MonitorSnapshot>> {
    Json(state.registry.list().await)
}

/// POST /api/monitors
///
/// Create a monitor and start probing immediately
pub async fn create_monitor(
    State(state): State<ApiState>,
    Json(request): Json<CreateMonitorRequest>,
) -> ApiResult<(StatusCode, Json<MonitorSnapshot>)> {
    let interval = request.interval.unwrap_or(DEFAULT_INTERVAL_MS);

    let snapshot = state
        .registry
        .create(&request.host, request.port, interval)
        .await?;

    state.persist().await;

    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// GET /api/monitors/:id
pub async fn get_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MonitorSnapshot>> {
    Ok(Json(state.registry.get(&id).await?))
}

/// DELETE /api/monitors/:id
///
/// Stop the monitor and discard its history
pub async fn delete_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    state.registry.delete(&id).await?;
    state.persist().await;

    Ok(Json(json!({ "message": "monitor deleted" })))
}

/// GET /api/monitors/:id/history
///
/// Probe outcomes for the monitor, oldest first
pub async fn get_history(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<ProbeOutcome>>> {
    let range = query.range.as_deref().and_then(HistoryRange::parse);
    let limit = query.limit.filter(|limit| *limit > 0);

    Ok(Json(state.registry.history(&id, range, limit).await?))
}

/// POST /api/monitors/:id/start
pub async fn start_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MonitorSnapshot>> {
    let snapshot = state.registry.start(&id).await?;
    state.persist().await;

    Ok(Json(snapshot))
}

/// POST /api/monitors/:id/stop
pub async fn stop_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MonitorSnapshot>> {
    let snapshot = state.registry.stop(&id).await?;
    state.persist().await;

    Ok(Json(snapshot))
}

/// PATCH /api/monitors/:id
///
/// Change the probe interval; a running loop restarts with the new cadence
pub async fn update_monitor(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateMonitorRequest>,
) -> ApiResult<Json<MonitorSnapshot>> {
    let snapshot = state.registry.reconfigure(&id, request.interval).await?;
    state.persist().await;

    Ok(Json(snapshot))
}
