use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::ScoreEntity,
    dto::{
        events::{
            ActivityChangeEvent, ChangeKind, FeedbackNewEvent, NotificationEvent, ScoreNewEvent,
            ScoreStatusEvent, SubActivityChangeEvent, TeamAddedEvent, TimerEndedEvent,
        },
        score::ScoreSummary,
    },
    state::{Room, SharedState, timers::TimerEntry},
};

/// Push a resolution outcome to the submitter's personal room.
pub fn broadcast_score_status(state: &SharedState, score: &ScoreEntity) {
    let payload = ScoreStatusEvent {
        score_id: score.id,
        status: score.status.kind(),
        reason: score.status.rejection_reason().map(str::to_string),
    };
    send(
        state,
        Room::User(score.user_id),
        &NotificationEvent::ScoreStatus(payload),
    );
}

/// Push a live feed entry to a team when a teammate submits a team score.
pub fn broadcast_score_new(state: &SharedState, team_id: Uuid, score: ScoreSummary) {
    send(
        state,
        Room::Team(team_id),
        &NotificationEvent::ScoreNew(ScoreNewEvent { score }),
    );
}

/// Hook for the team directory: tell a member they were added to a team.
pub fn broadcast_team_added(state: &SharedState, team_id: Uuid, user_id: Uuid) {
    send(
        state,
        Room::User(user_id),
        &NotificationEvent::TeamAdded(TeamAddedEvent { team_id, user_id }),
    );
}

/// Hook for the activity directory: an activity definition changed.
pub fn broadcast_activity_change(state: &SharedState, activity_id: Uuid, change: ChangeKind) {
    send(
        state,
        Room::Activity(activity_id),
        &NotificationEvent::ActivityChange(ActivityChangeEvent {
            activity_id,
            change,
        }),
    );
}

/// Hook for the activity directory: a sub-activity list changed.
pub fn broadcast_sub_activity_change(
    state: &SharedState,
    activity_id: Uuid,
    sub_activity: String,
    change: ChangeKind,
) {
    send(
        state,
        Room::Activity(activity_id),
        &NotificationEvent::SubActivityChange(SubActivityChangeEvent {
            activity_id,
            sub_activity,
            change,
        }),
    );
}

/// Hook for the feedback collaborator: new feedback arrived.
pub fn broadcast_feedback_new(state: &SharedState, feedback_id: Uuid, user_id: Uuid) {
    send(
        state,
        Room::Broadcast,
        &NotificationEvent::FeedbackNew(FeedbackNewEvent {
            feedback_id,
            user_id,
        }),
    );
}

/// Announce a naturally expired countdown to its activity room.
pub fn broadcast_timer_ended(state: &SharedState, entry: &TimerEntry) {
    send(
        state,
        Room::Activity(entry.activity_id),
        &NotificationEvent::TimerEnded(TimerEndedEvent::from(entry)),
    );
}

fn send(state: &SharedState, room: Room, event: &NotificationEvent) {
    match event.to_server_event() {
        Ok(wire) => {
            state.fanout().publish(&room, wire);
        }
        Err(err) => warn!(
            event = event.name(),
            %room,
            error = %err,
            "failed to serialize fanout payload; event dropped"
        ),
    }
}
