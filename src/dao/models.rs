use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Whether a score is credited to an individual member or to a whole team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreContext {
    /// The score counts toward the submitting member only.
    Individual,
    /// The score counts toward the team named in `team_id`.
    Team,
}

/// Resolution state of a submitted score. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ScoreStatus {
    /// Awaiting a moderator decision.
    Pending,
    /// Accepted; the score now counts toward rankings and statistics.
    Approved,
    /// Refused with a mandatory reason.
    Rejected {
        /// Moderator-supplied explanation shown to the submitter.
        reason: String,
    },
}

impl ScoreStatus {
    /// Discriminant of this status, without the rejection payload.
    pub fn kind(&self) -> ScoreStatusKind {
        match self {
            ScoreStatus::Pending => ScoreStatusKind::Pending,
            ScoreStatus::Approved => ScoreStatusKind::Approved,
            ScoreStatus::Rejected { .. } => ScoreStatusKind::Rejected,
        }
    }

    /// Whether the status can never change again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ScoreStatus::Pending)
    }

    /// Rejection reason, when this status carries one.
    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            ScoreStatus::Rejected { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Discriminant-only view of [`ScoreStatus`], used for filtering and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScoreStatusKind {
    /// Awaiting a moderator decision.
    Pending,
    /// Accepted.
    Approved,
    /// Refused.
    Rejected,
}

/// Moderator identity and instant recorded when a score is resolved.
///
/// Written at most once per score; the store rejects any second resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Moderator who resolved the score.
    pub resolved_by: Uuid,
    /// Instant the resolution committed.
    #[serde(with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
    /// Optional moderator note attached during resolution.
    pub comments: Option<String>,
}

/// A single submitted measurement tied to an activity, owned by a user or a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntity {
    /// Stable identifier assigned by the store.
    pub id: Uuid,
    /// Activity the score was achieved in.
    pub activity_id: Uuid,
    /// Optional sub-activity name within the activity's sub-activity list.
    pub sub_activity: Option<String>,
    /// Whether the score credits the individual or the team.
    pub context: ScoreContext,
    /// Member who submitted the score.
    pub user_id: Uuid,
    /// Team credited with the score; present iff `context` is `Team`.
    pub team_id: Option<Uuid>,
    /// Achieved value, strictly positive and at most `max_possible`.
    pub value: f64,
    /// Best achievable value for the activity, strictly positive.
    pub max_possible: f64,
    /// Lifecycle state of the score.
    pub status: ScoreStatus,
    /// Free-text note from the submitter.
    pub comments: Option<String>,
    /// Parent score when this record is a sub-score. Parents are always
    /// top-level records; nesting depth is exactly one.
    pub parent_score_id: Option<Uuid>,
    /// Submission instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Resolution record, set once the status leaves `Pending`.
    pub resolution: Option<Resolution>,
}

impl ScoreEntity {
    /// Achieved fraction of the maximum, derived so it can never drift from
    /// `value` / `max_possible`.
    pub fn normalized_percentage(&self) -> f64 {
        self.value / self.max_possible
    }

    /// Whether this record is a sub-score of another score.
    pub fn is_sub_score(&self) -> bool {
        self.parent_score_id.is_some()
    }
}

/// Filter over the stored score set. All populated fields must match; the
/// creation range is half-open: `created_after <= created_at < created_before`.
#[derive(Debug, Clone, Default)]
pub struct ScoreFilter {
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
    /// Inclusive lower creation bound.
    pub created_after: Option<OffsetDateTime>,
    /// Exclusive upper creation bound.
    pub created_before: Option<OffsetDateTime>,
}

impl ScoreFilter {
    /// Whether `score` satisfies every populated criterion.
    pub fn matches(&self, score: &ScoreEntity) -> bool {
        if let Some(activity_id) = self.activity_id
            && score.activity_id != activity_id
        {
            return false;
        }
        if let Some(sub_activity) = &self.sub_activity
            && score.sub_activity.as_deref() != Some(sub_activity.as_str())
        {
            return false;
        }
        if let Some(user_id) = self.user_id
            && score.user_id != user_id
        {
            return false;
        }
        if let Some(team_id) = self.team_id
            && score.team_id != Some(team_id)
        {
            return false;
        }
        if let Some(status) = self.status
            && score.status.kind() != status
        {
            return false;
        }
        if let Some(after) = self.created_after
            && score.created_at < after
        {
            return false;
        }
        if let Some(before) = self.created_before
            && score.created_at >= before
        {
            return false;
        }
        true
    }
}
