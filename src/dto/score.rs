use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dao::models::{ScoreContext, ScoreEntity, ScoreFilter, ScoreStatusKind},
    dto::{
        format_timestamp,
        validation::{validate_label, validate_reason},
    },
};

/// Payload submitted by a member to record a new score.
///
/// The submitter is taken from the authenticated identity, never from the
/// payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitScoreRequest {
    /// Activity the score was achieved in.
    pub activity_id: Uuid,
    /// Optional sub-activity name within the activity.
    #[serde(default)]
    pub sub_activity: Option<String>,
    /// Whether the score credits the individual or the team.
    pub context: ScoreContext,
    /// Team credited with the score; required iff `context` is `team`.
    #[serde(default)]
    pub team_id: Option<Uuid>,
    /// Achieved value.
    pub value: f64,
    /// Best achievable value.
    pub max_possible: f64,
    /// Free-text note from the submitter.
    #[serde(default)]
    pub comments: Option<String>,
    /// Parent score when submitting a sub-score.
    #[serde(default)]
    pub parent_score_id: Option<Uuid>,
}

impl Validate for SubmitScoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !(self.value > 0.0) {
            errors.add("value", positive_error("value"));
        }
        if !(self.max_possible > 0.0) {
            errors.add("max_possible", positive_error("max_possible"));
        }
        if self.value > self.max_possible {
            let mut err = ValidationError::new("value_exceeds_max");
            err.message = Some("value must not exceed max_possible".into());
            errors.add("value", err);
        }

        match (self.context, self.team_id) {
            (ScoreContext::Team, None) => {
                let mut err = ValidationError::new("team_id_required");
                err.message = Some("team context requires a team_id".into());
                errors.add("team_id", err);
            }
            (ScoreContext::Individual, Some(_)) => {
                let mut err = ValidationError::new("team_id_forbidden");
                err.message = Some("individual context must not carry a team_id".into());
                errors.add("team_id", err);
            }
            _ => {}
        }

        if let Some(name) = &self.sub_activity
            && let Err(err) = validate_label(name)
        {
            errors.add("sub_activity", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn positive_error(field: &str) -> ValidationError {
    let mut err = ValidationError::new("not_positive");
    err.message = Some(format!("{field} must be strictly positive").into());
    err
}

/// Payload accepted by the approve endpoint.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct ApproveScoreRequest {
    /// Optional moderator note stored with the resolution.
    #[serde(default)]
    pub comments: Option<String>,
}

/// Payload accepted by the reject endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectScoreRequest {
    /// Mandatory, non-empty explanation shown to the submitter.
    pub reason: String,
    /// Optional moderator note stored with the resolution.
    #[serde(default)]
    pub comments: Option<String>,
}

impl Validate for RejectScoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_reason(&self.reason) {
            errors.add("reason", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Public projection of a score record returned by the REST surface.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ScoreSummary {
    /// Score identifier.
    pub id: Uuid,
    /// Activity the score was achieved in.
    pub activity_id: Uuid,
    /// Sub-activity name when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_activity: Option<String>,
    /// Individual or team crediting.
    pub context: ScoreContext,
    /// Submitting member.
    pub user_id: Uuid,
    /// Credited team for team-context scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<Uuid>,
    /// Achieved value.
    pub value: f64,
    /// Best achievable value.
    pub max_possible: f64,
    /// Achieved fraction of the maximum.
    pub normalized_percentage: f64,
    /// Lifecycle state.
    pub status: ScoreStatusKind,
    /// Rejection reason for rejected scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    /// Submitter note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    /// Parent score for sub-scores.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_score_id: Option<Uuid>,
    /// Submission instant, RFC 3339.
    pub created_at: String,
    /// Resolution instant, RFC 3339, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    /// Resolving moderator, once resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<Uuid>,
}

impl From<ScoreEntity> for ScoreSummary {
    fn from(entity: ScoreEntity) -> Self {
        let normalized_percentage = entity.normalized_percentage();
        Self {
            id: entity.id,
            activity_id: entity.activity_id,
            sub_activity: entity.sub_activity,
            context: entity.context,
            user_id: entity.user_id,
            team_id: entity.team_id,
            value: entity.value,
            max_possible: entity.max_possible,
            normalized_percentage,
            status: entity.status.kind(),
            rejection_reason: entity.status.rejection_reason().map(str::to_string),
            comments: entity.comments,
            parent_score_id: entity.parent_score_id,
            created_at: format_timestamp(entity.created_at),
            resolved_at: entity
                .resolution
                .as_ref()
                .map(|resolution| format_timestamp(resolution.resolved_at)),
            resolved_by: entity
                .resolution
                .as_ref()
                .map(|resolution| resolution.resolved_by),
        }
    }
}

/// Query parameters accepted by the score listing endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScoreListQuery {
    /// Restrict to a single activity.
    pub activity_id: Option<Uuid>,
    /// Restrict to a sub-activity name.
    pub sub_activity: Option<String>,
    /// Restrict to a submitting user.
    pub user_id: Option<Uuid>,
    /// Restrict to a credited team.
    pub team_id: Option<Uuid>,
    /// Restrict to a lifecycle state.
    pub status: Option<ScoreStatusKind>,
    /// Inclusive lower creation bound, RFC 3339.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[param(value_type = Option<String>)]
    pub created_after: Option<OffsetDateTime>,
    /// Exclusive upper creation bound, RFC 3339.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[param(value_type = Option<String>)]
    pub created_before: Option<OffsetDateTime>,
}

impl From<ScoreListQuery> for ScoreFilter {
    fn from(query: ScoreListQuery) -> Self {
        ScoreFilter {
            activity_id: query.activity_id,
            sub_activity: query.sub_activity,
            user_id: query.user_id,
            team_id: query.team_id,
            status: query.status,
            created_after: query.created_after,
            created_before: query.created_before,
        }
    }
}
