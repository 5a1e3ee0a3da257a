use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::{
        identity::Identity,
        ranking::{RankingEntry, RankingQuery},
    },
    error::AppError,
    services::ranking_service,
    state::SharedState,
};

/// Leaderboard query routes.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rankings", get(rankings))
}

/// Compute a leaderboard over the approved scores in the requested window.
#[utoipa::path(
    get,
    path = "/rankings",
    tag = "rankings",
    params(RankingQuery),
    responses(
        (status = 200, description = "Ordered leaderboard, possibly empty", body = [RankingEntry]),
        (status = 400, description = "Invalid filter combination")
    )
)]
pub async fn rankings(
    State(state): State<SharedState>,
    _identity: Identity,
    Query(query): Query<RankingQuery>,
) -> Result<Json<Vec<RankingEntry>>, AppError> {
    Ok(Json(ranking_service::rank(&state, query).await?))
}
