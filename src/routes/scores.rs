use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        identity::Identity,
        score::{
            ApproveScoreRequest, RejectScoreRequest, ScoreListQuery, ScoreSummary,
            SubmitScoreRequest,
        },
    },
    error::AppError,
    services::{approval_service, score_service},
    state::SharedState,
};

/// Routes handling score submission, queries, and resolution.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/scores", post(submit_score).get(list_scores))
        .route("/scores/{id}", get(get_score))
        .route("/scores/{id}/approve", post(approve_score))
        .route("/scores/{id}/reject", post(reject_score))
}

/// Submit a new score; it is recorded as pending until a moderator resolves it.
#[utoipa::path(
    post,
    path = "/scores",
    tag = "scores",
    params(
        ("X-User-Id" = String, Header, description = "Authenticated user id propagated by the gateway"),
        ("X-User-Role" = String, Header, description = "Authenticated role propagated by the gateway")
    ),
    request_body = SubmitScoreRequest,
    responses(
        (status = 200, description = "Score recorded as pending", body = ScoreSummary),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn submit_score(
    State(state): State<SharedState>,
    identity: Identity,
    Valid(Json(payload)): Valid<Json<SubmitScoreRequest>>,
) -> Result<Json<ScoreSummary>, AppError> {
    let summary = score_service::submit_score(&state, identity, payload).await?;
    Ok(Json(summary))
}

/// List scores matching the filter query.
#[utoipa::path(
    get,
    path = "/scores",
    tag = "scores",
    params(ScoreListQuery),
    responses((status = 200, description = "Matching scores", body = [ScoreSummary]))
)]
pub async fn list_scores(
    State(state): State<SharedState>,
    _identity: Identity,
    Query(query): Query<ScoreListQuery>,
) -> Result<Json<Vec<ScoreSummary>>, AppError> {
    Ok(Json(score_service::list_scores(&state, query).await?))
}

/// Fetch a single score by id.
#[utoipa::path(
    get,
    path = "/scores/{id}",
    tag = "scores",
    params(("id" = Uuid, Path, description = "Score identifier")),
    responses(
        (status = 200, description = "Score", body = ScoreSummary),
        (status = 404, description = "Unknown score")
    )
)]
pub async fn get_score(
    State(state): State<SharedState>,
    _identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<Json<ScoreSummary>, AppError> {
    Ok(Json(score_service::get_score(&state, id).await?))
}

/// Approve a pending score (moderator only).
#[utoipa::path(
    post,
    path = "/scores/{id}/approve",
    tag = "scores",
    params(
        ("id" = Uuid, Path, description = "Score identifier"),
        ("X-User-Id" = String, Header, description = "Authenticated user id propagated by the gateway"),
        ("X-User-Role" = String, Header, description = "Authenticated role propagated by the gateway")
    ),
    request_body = ApproveScoreRequest,
    responses(
        (status = 200, description = "Score approved", body = ScoreSummary),
        (status = 409, description = "Score was already resolved by someone else")
    )
)]
pub async fn approve_score(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ApproveScoreRequest>>,
) -> Result<Json<ScoreSummary>, AppError> {
    let summary = approval_service::approve(&state, identity, id, payload).await?;
    Ok(Json(summary))
}

/// Reject a pending score with a reason (moderator only).
#[utoipa::path(
    post,
    path = "/scores/{id}/reject",
    tag = "scores",
    params(
        ("id" = Uuid, Path, description = "Score identifier"),
        ("X-User-Id" = String, Header, description = "Authenticated user id propagated by the gateway"),
        ("X-User-Role" = String, Header, description = "Authenticated role propagated by the gateway")
    ),
    request_body = RejectScoreRequest,
    responses(
        (status = 200, description = "Score rejected", body = ScoreSummary),
        (status = 409, description = "Score was already resolved by someone else")
    )
)]
pub async fn reject_score(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<RejectScoreRequest>>,
) -> Result<Json<ScoreSummary>, AppError> {
    let summary = approval_service::reject(&state, identity, id, payload).await?;
    Ok(Json(summary))
}
