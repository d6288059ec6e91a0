use std::net::IpAddr;
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::error::{ApiError, ApiResult};
use crate::model::{
    AddContainerRequest, ContainerRecord, DeleteContainerResponse, NewContainerResponse, PingReport,
    UpdateContainerRequest,
};
use crate::service::Upserted;
use crate::state::AppState;

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);
    let body_limit = state.config.server.body_limit;

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/containers", get(list_containers).post(add_container))
        .route(
            "/v1/containers/{ip}",
            get(get_container)
                .post(report_container)
                .put(update_container)
                .delete(delete_container),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Records are keyed by IP literal.
fn parse_ip(raw: &str) -> ApiResult<String> {
    raw.parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| ApiError::InvalidRequest(format!("not an IP address: {}", raw)))
}

async fn health_handler(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let containers = state.containers.all_containers().await?.len();
    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "containers": containers,
    })))
}

async fn list_containers(State(state): State<AppState>) -> ApiResult<Json<Vec<ContainerRecord>>> {
    Ok(Json(state.containers.all_containers().await?))
}

async fn get_container(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> ApiResult<Json<ContainerRecord>> {
    let ip = parse_ip(&ip)?;
    state.containers
        .container(&ip)
        .await?
        .map(Json)
        .ok_or(ApiError::ContainerNotFound(ip))
}

/// Upsert from a pinger report: 201 on create, 200 on update.
async fn report_container(
    State(state): State<AppState>,
    Path(ip): Path<String>,
    Json(report): Json<PingReport>,
) -> ApiResult<(StatusCode, Json<ContainerRecord>)> {
    let ip = parse_ip(&ip)?;
    let response = match state.containers.report(&ip, report).await? {
        Upserted::Created(record) => (StatusCode::CREATED, Json(record)),
        Upserted::Updated(record) => (StatusCode::OK, Json(record)),
    };
    Ok(response)
}

async fn add_container(
    State(state): State<AppState>,
    Json(req): Json<AddContainerRequest>,
) -> ApiResult<(StatusCode, Json<NewContainerResponse>)> {
    let ip = parse_ip(&req.ip)?;
    let ip = state.containers
        .new_container(ContainerRecord {
            ip,
            ping_time: req.ping_time,
            last_successful: req.last_successful,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(NewContainerResponse { ip })))
}

async fn update_container(
    State(state): State<AppState>,
    Path(ip): Path<String>,
    Json(req): Json<UpdateContainerRequest>,
) -> ApiResult<Json<ContainerRecord>> {
    let ip = parse_ip(&ip)?;
    let record = state.containers
        .update_container(ContainerRecord {
            ip,
            ping_time: req.ping_time,
            last_successful: req.last_successful,
        })
        .await?;
    Ok(Json(record))
}

async fn delete_container(
    State(state): State<AppState>,
    Path(ip): Path<String>,
) -> ApiResult<Json<DeleteContainerResponse>> {
    let ip = parse_ip(&ip)?;
    state.containers.delete_container(&ip).await?;
    Ok(Json(DeleteContainerResponse { is_success: true }))
}
