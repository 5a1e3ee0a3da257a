use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        identity::Identity,
        timer::{StartTimerRequest, StopTimerRequest, TimerListQuery, TimerSummary},
    },
    error::AppError,
    services::timer_service,
    state::SharedState,
};

/// Activity timer routes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/timers", get(list_timers))
        .route("/timers/start", post(start_timer))
        .route("/timers/stop", post(stop_timer))
}

/// Start a named countdown for an activity.
#[utoipa::path(
    post,
    path = "/timers/start",
    tag = "timers",
    params(
        ("X-User-Id" = String, Header, description = "Authenticated user id propagated by the gateway"),
        ("X-User-Role" = String, Header, description = "Authenticated role propagated by the gateway")
    ),
    request_body = StartTimerRequest,
    responses(
        (status = 200, description = "Timer started", body = TimerSummary),
        (status = 409, description = "A timer with that name is already running")
    )
)]
pub async fn start_timer(
    State(state): State<SharedState>,
    _identity: Identity,
    Valid(Json(payload)): Valid<Json<StartTimerRequest>>,
) -> Result<Json<TimerSummary>, AppError> {
    Ok(Json(timer_service::start_timer(&state, payload).await?))
}

/// Stop a named countdown; stopping a finished timer is a no-op success.
#[utoipa::path(
    post,
    path = "/timers/stop",
    tag = "timers",
    params(
        ("X-User-Id" = String, Header, description = "Authenticated user id propagated by the gateway"),
        ("X-User-Role" = String, Header, description = "Authenticated role propagated by the gateway")
    ),
    request_body = StopTimerRequest,
    responses(
        (status = 200, description = "Timer state after the stop", body = TimerSummary),
        (status = 404, description = "No timer with that name was ever started")
    )
)]
pub async fn stop_timer(
    State(state): State<SharedState>,
    _identity: Identity,
    Valid(Json(payload)): Valid<Json<StopTimerRequest>>,
) -> Result<Json<TimerSummary>, AppError> {
    Ok(Json(timer_service::stop_timer(&state, payload).await?))
}

/// List timer runs; querying is what detects and announces expiries.
#[utoipa::path(
    get,
    path = "/timers",
    tag = "timers",
    params(TimerListQuery),
    responses((status = 200, description = "Timer runs, current and historical", body = [TimerSummary]))
)]
pub async fn list_timers(
    State(state): State<SharedState>,
    _identity: Identity,
    Query(query): Query<TimerListQuery>,
) -> Json<Vec<TimerSummary>> {
    Json(timer_service::list_timers(&state, query).await)
}
