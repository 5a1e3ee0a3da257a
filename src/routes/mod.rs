use axum::Router;

use crate::state::SharedState;

/// Swagger UI routes.
pub mod docs;
/// Health check routes.
pub mod health;
/// Leaderboard query routes.
pub mod rankings;
/// Score submission and resolution routes.
pub mod scores;
/// SSE room subscription routes.
pub mod sse;
/// Activity timer routes.
pub mod timers;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(scores::router())
        .merge(rankings::router())
        .merge(timers::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
