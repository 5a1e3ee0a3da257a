use time::OffsetDateTime;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ScoreContext, ScoreEntity, ScoreStatus},
    dto::{
        identity::Identity,
        score::{ScoreListQuery, ScoreSummary, SubmitScoreRequest},
    },
    error::ServiceError,
    services::fanout_events,
    state::SharedState,
};

/// Record a new score as a pending record after validating it against the
/// activity/team/user directories.
///
/// A pending submission triggers no resolution fanout; a team-context
/// submission additionally feeds the team's live room so teammates see it.
pub async fn submit_score(
    state: &SharedState,
    identity: Identity,
    request: SubmitScoreRequest,
) -> Result<ScoreSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    check_directory_references(state, identity.user_id, &request).await?;

    let store = state.require_score_store().await?;

    if let Some(parent_id) = request.parent_score_id {
        let Some(parent) = state.store_op(store.find(parent_id)).await? else {
            return Err(ServiceError::InvalidInput(format!(
                "parent score `{parent_id}` does not exist"
            )));
        };
        // Sub-scores are leaves; nesting depth is exactly one level.
        if parent.is_sub_score() {
            return Err(ServiceError::InvalidInput(format!(
                "score `{parent_id}` is itself a sub-score and cannot have sub-scores"
            )));
        }
    }

    let entity = ScoreEntity {
        id: Uuid::new_v4(),
        activity_id: request.activity_id,
        sub_activity: request.sub_activity,
        context: request.context,
        user_id: identity.user_id,
        team_id: request.team_id,
        value: request.value,
        max_possible: request.max_possible,
        status: ScoreStatus::Pending,
        comments: request.comments,
        parent_score_id: request.parent_score_id,
        created_at: OffsetDateTime::now_utc(),
        resolution: None,
    };

    state.store_op(store.create(entity.clone())).await?;

    let summary = ScoreSummary::from(entity);
    if let (ScoreContext::Team, Some(team_id)) = (summary.context, summary.team_id) {
        fanout_events::broadcast_score_new(state, team_id, summary.clone());
    }

    Ok(summary)
}

/// Fetch one score by id.
pub async fn get_score(state: &SharedState, id: Uuid) -> Result<ScoreSummary, ServiceError> {
    let store = state.require_score_store().await?;
    let Some(entity) = state.store_op(store.find(id)).await? else {
        return Err(ServiceError::NotFound(format!("score `{id}` not found")));
    };
    Ok(entity.into())
}

/// List scores matching the query filter.
pub async fn list_scores(
    state: &SharedState,
    query: ScoreListQuery,
) -> Result<Vec<ScoreSummary>, ServiceError> {
    let store = state.require_score_store().await?;
    let scores = state.store_op(store.list(query.into())).await?;
    Ok(scores.into_iter().map(Into::into).collect())
}

/// Verify every referenced directory entry exists before any state change.
async fn check_directory_references(
    state: &SharedState,
    user_id: Uuid,
    request: &SubmitScoreRequest,
) -> Result<(), ServiceError> {
    let directory = state.directory();

    if !state
        .store_op(directory.activity_exists(request.activity_id))
        .await?
    {
        return Err(ServiceError::InvalidInput(format!(
            "activity `{}` does not exist",
            request.activity_id
        )));
    }

    if let Some(name) = &request.sub_activity
        && !state
            .store_op(directory.sub_activity_exists(request.activity_id, name.clone()))
            .await?
    {
        return Err(ServiceError::InvalidInput(format!(
            "activity `{}` has no sub-activity named `{name}`",
            request.activity_id
        )));
    }

    if !state.store_op(directory.user_exists(user_id)).await? {
        return Err(ServiceError::InvalidInput(format!(
            "user `{user_id}` is not known to the directory"
        )));
    }

    if let Some(team_id) = request.team_id
        && !state.store_op(directory.team_exists(team_id)).await?
    {
        return Err(ServiceError::InvalidInput(format!(
            "team `{team_id}` does not exist"
        )));
    }

    Ok(())
}
