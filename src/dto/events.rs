use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::ScoreStatusKind,
    dto::{format_timestamp, score::ScoreSummary},
    state::timers::TimerEntry,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE room channels.
pub struct ServerEvent {
    /// SSE event name; `None` sends an unnamed data-only event.
    pub event: Option<String>,
    /// Serialized JSON body.
    pub data: String,
}

impl ServerEvent {
    /// Construct an event from an already serialized body.
    pub fn new<E>(event: E, data: String) -> Self
    where
        E: Into<Option<String>>,
    {
        Self {
            event: event.into(),
            data,
        }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

/// Closed set of realtime events carried by the fanout.
///
/// Anything outside this set never reaches a room: the broadcast helpers only
/// build these variants, and a payload that fails to serialize is dropped with
/// a local diagnostic.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A pending score was approved or rejected; sent to the submitter.
    ScoreStatus(ScoreStatusEvent),
    /// A team score was submitted; sent to the team's live feed.
    ScoreNew(ScoreNewEvent),
    /// A member was added to a team; sent to the member.
    TeamAdded(TeamAddedEvent),
    /// An activity definition changed.
    ActivityChange(ActivityChangeEvent),
    /// A sub-activity list changed.
    SubActivityChange(SubActivityChangeEvent),
    /// New feedback was collected.
    FeedbackNew(FeedbackNewEvent),
    /// An activity timer reached its end time.
    TimerEnded(TimerEndedEvent),
}

impl NotificationEvent {
    /// Wire name of the event type.
    pub fn name(&self) -> &'static str {
        match self {
            NotificationEvent::ScoreStatus(_) => "score:status",
            NotificationEvent::ScoreNew(_) => "score:new",
            NotificationEvent::TeamAdded(_) => "team:added",
            NotificationEvent::ActivityChange(_) => "activity:change",
            NotificationEvent::SubActivityChange(_) => "subactivity:change",
            NotificationEvent::FeedbackNew(_) => "feedback:new",
            NotificationEvent::TimerEnded(_) => "timer:ended",
        }
    }

    /// Serialize into the wire representation dispatched to rooms.
    pub fn to_server_event(&self) -> serde_json::Result<ServerEvent> {
        let data = match self {
            NotificationEvent::ScoreStatus(payload) => serde_json::to_string(payload)?,
            NotificationEvent::ScoreNew(payload) => serde_json::to_string(payload)?,
            NotificationEvent::TeamAdded(payload) => serde_json::to_string(payload)?,
            NotificationEvent::ActivityChange(payload) => serde_json::to_string(payload)?,
            NotificationEvent::SubActivityChange(payload) => serde_json::to_string(payload)?,
            NotificationEvent::FeedbackNew(payload) => serde_json::to_string(payload)?,
            NotificationEvent::TimerEnded(payload) => serde_json::to_string(payload)?,
        };
        Ok(ServerEvent::new(self.name().to_string(), data))
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Sent to the submitter's room when their score is resolved.
pub struct ScoreStatusEvent {
    /// Resolved score.
    pub score_id: Uuid,
    /// Terminal status the score moved to.
    pub status: ScoreStatusKind,
    /// Rejection reason when the status is `rejected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Sent to a team's room when a teammate submits a team score.
pub struct ScoreNewEvent {
    /// The freshly submitted, still pending score.
    pub score: ScoreSummary,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Sent to a member's room when they are added to a team.
pub struct TeamAddedEvent {
    /// Team the member joined.
    pub team_id: Uuid,
    /// Added member.
    pub user_id: Uuid,
}

/// What happened to a directory record.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Record was created.
    Created,
    /// Record was updated.
    Updated,
    /// Record was deleted.
    Deleted,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Broadcast to an activity room when the activity definition changes.
pub struct ActivityChangeEvent {
    /// Changed activity.
    pub activity_id: Uuid,
    /// Kind of change.
    pub change: ChangeKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Broadcast to an activity room when its sub-activity list changes.
pub struct SubActivityChangeEvent {
    /// Owning activity.
    pub activity_id: Uuid,
    /// Affected sub-activity name.
    pub sub_activity: String,
    /// Kind of change.
    pub change: ChangeKind,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Broadcast when a member files new feedback.
pub struct FeedbackNewEvent {
    /// Feedback record id owned by the feedback collaborator.
    pub feedback_id: Uuid,
    /// Filing member.
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
/// Broadcast to an activity room when a countdown reaches its end time.
pub struct TimerEndedEvent {
    /// Identifier of the timer run.
    pub timer_id: Uuid,
    /// Timer name.
    pub name: String,
    /// Owning activity.
    pub activity_id: Uuid,
    /// Natural end instant, RFC 3339.
    pub ended_at: String,
}

impl From<&TimerEntry> for TimerEndedEvent {
    fn from(entry: &TimerEntry) -> Self {
        Self {
            timer_id: entry.id,
            name: entry.name.clone(),
            activity_id: entry.activity_id,
            ended_at: format_timestamp(entry.end_time),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::ScoreContext;

    fn score_summary() -> ScoreSummary {
        ScoreSummary {
            id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            sub_activity: None,
            context: ScoreContext::Team,
            user_id: Uuid::new_v4(),
            team_id: Some(Uuid::new_v4()),
            value: 50.0,
            max_possible: 100.0,
            normalized_percentage: 0.5,
            status: ScoreStatusKind::Pending,
            rejection_reason: None,
            comments: None,
            parent_score_id: None,
            created_at: "2026-08-06T00:00:00Z".into(),
            resolved_at: None,
            resolved_by: None,
        }
    }

    #[test]
    fn event_names_cover_the_closed_set() {
        let cases: Vec<(NotificationEvent, &str)> = vec![
            (
                NotificationEvent::ScoreStatus(ScoreStatusEvent {
                    score_id: Uuid::new_v4(),
                    status: ScoreStatusKind::Approved,
                    reason: None,
                }),
                "score:status",
            ),
            (
                NotificationEvent::TeamAdded(TeamAddedEvent {
                    team_id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                }),
                "team:added",
            ),
            (
                NotificationEvent::ActivityChange(ActivityChangeEvent {
                    activity_id: Uuid::new_v4(),
                    change: ChangeKind::Updated,
                }),
                "activity:change",
            ),
            (
                NotificationEvent::SubActivityChange(SubActivityChangeEvent {
                    activity_id: Uuid::new_v4(),
                    sub_activity: "sprint".into(),
                    change: ChangeKind::Created,
                }),
                "subactivity:change",
            ),
            (
                NotificationEvent::FeedbackNew(FeedbackNewEvent {
                    feedback_id: Uuid::new_v4(),
                    user_id: Uuid::new_v4(),
                }),
                "feedback:new",
            ),
            (
                NotificationEvent::ScoreNew(ScoreNewEvent {
                    score: score_summary(),
                }),
                "score:new",
            ),
            (
                NotificationEvent::TimerEnded(TimerEndedEvent {
                    timer_id: Uuid::new_v4(),
                    name: "quiz".into(),
                    activity_id: Uuid::new_v4(),
                    ended_at: "2026-08-06T00:01:00Z".into(),
                }),
                "timer:ended",
            ),
        ];

        for (event, expected) in cases {
            assert_eq!(event.name(), expected);
        }
    }

    #[test]
    fn wire_event_carries_name_and_json_body() {
        let score_id = Uuid::new_v4();
        let event = NotificationEvent::ScoreStatus(ScoreStatusEvent {
            score_id,
            status: ScoreStatusKind::Rejected,
            reason: Some("no evidence".into()),
        });

        let wire = event.to_server_event().unwrap();
        assert_eq!(wire.event.as_deref(), Some("score:status"));
        let body: serde_json::Value = serde_json::from_str(&wire.data).unwrap();
        assert_eq!(body["score_id"], score_id.to_string());
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["reason"], "no evidence");
    }

    #[test]
    fn approved_status_event_omits_the_reason_field() {
        let event = NotificationEvent::ScoreStatus(ScoreStatusEvent {
            score_id: Uuid::new_v4(),
            status: ScoreStatusKind::Approved,
            reason: None,
        });
        let wire = event.to_server_event().unwrap();
        assert!(!wire.data.contains("reason"));
    }
}
