use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{models::Resolution, score_store::ResolveOutcome},
    dto::{
        identity::Identity,
        score::{ApproveScoreRequest, RejectScoreRequest, ScoreSummary},
    },
    error::ServiceError,
    services::fanout_events,
    state::{
        SharedState,
        lifecycle::{self, ResolutionAction},
    },
};

/// Approve a pending score.
///
/// Publishes `score:status` to the submitter's room once the transition
/// commits. A score that is no longer pending yields a conflict; the caller
/// should re-fetch and present the score as already resolved.
pub async fn approve(
    state: &SharedState,
    identity: Identity,
    score_id: Uuid,
    request: ApproveScoreRequest,
) -> Result<ScoreSummary, ServiceError> {
    resolve(
        state,
        identity,
        score_id,
        ResolutionAction::Approve,
        request.comments,
    )
    .await
}

/// Reject a pending score with a mandatory reason.
pub async fn reject(
    state: &SharedState,
    identity: Identity,
    score_id: Uuid,
    request: RejectScoreRequest,
) -> Result<ScoreSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    resolve(
        state,
        identity,
        score_id,
        ResolutionAction::Reject {
            reason: request.reason,
        },
        request.comments,
    )
    .await
}

/// Run the guarded transition: exactly one of two racing resolutions commits,
/// the other observes the terminal state and reports a conflict.
async fn resolve(
    state: &SharedState,
    identity: Identity,
    score_id: Uuid,
    action: ResolutionAction,
    comments: Option<String>,
) -> Result<ScoreSummary, ServiceError> {
    ensure_moderator(&identity)?;

    let store = state.require_score_store().await?;
    let resolution = Resolution {
        resolved_by: identity.user_id,
        resolved_at: OffsetDateTime::now_utc(),
        comments,
    };

    let outcome = state
        .store_op(store.mark_resolved(score_id, action.target_status(), resolution))
        .await?;

    match outcome {
        ResolveOutcome::Resolved(entity) => {
            fanout_events::broadcast_score_status(state, &entity);
            Ok(entity.into())
        }
        ResolveOutcome::AlreadyResolved(entity) => {
            Err(match lifecycle::resolve(&entity.status, &action) {
                Err(invalid) => invalid.into(),
                // The record mutated again between the guard and this check;
                // still a lost resolution race.
                Ok(_) => {
                    ServiceError::Conflict("score was already resolved by another moderator".into())
                }
            })
        }
        ResolveOutcome::NotFound => Err(ServiceError::NotFound(format!(
            "score `{score_id}` not found"
        ))),
    }
}

fn ensure_moderator(identity: &Identity) -> Result<(), ServiceError> {
    if identity.role.can_moderate() {
        return Ok(());
    }
    Err(ServiceError::Forbidden(
        "resolving scores requires a moderator role".into(),
    ))
}
