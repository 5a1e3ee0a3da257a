use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;
use uuid::Uuid;

use crate::{
    services::sse_service,
    state::{Room, SharedState},
};

/// Configure the SSE room endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new()
        .route("/sse/users/{id}", get(user_stream))
        .route("/sse/teams/{id}", get(team_stream))
}

#[utoipa::path(
    get,
    path = "/sse/users/{id}",
    tag = "sse",
    params(("id" = Uuid, Path, description = "User whose personal room to join")),
    responses((status = 200, description = "Personal event stream (score:status, team:added)", content_type = "text/event-stream", body = String))
)]
/// Stream the personal room of a user to a connected client.
pub async fn user_stream(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let subscription = sse_service::subscribe_room(&state, Room::User(id));
    info!(room = %subscription.room(), "new SSE connection");
    sse_service::to_sse_stream(subscription, state.sse_keepalive())
}

#[utoipa::path(
    get,
    path = "/sse/teams/{id}",
    tag = "sse",
    params(("id" = Uuid, Path, description = "Team whose room to join")),
    responses((status = 200, description = "Team event stream (score:new)", content_type = "text/event-stream", body = String))
)]
/// Stream the shared room of a team to a connected client.
pub async fn team_stream(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let subscription = sse_service::subscribe_room(&state, Room::Team(id));
    info!(room = %subscription.room(), "new SSE connection");
    sse_service::to_sse_stream(subscription, state.sse_keepalive())
}
