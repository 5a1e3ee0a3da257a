use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    dto::{format_timestamp, validation::validate_label},
    state::timers::TimerEntry,
};

/// Payload starting a named countdown for an activity.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartTimerRequest {
    /// Timer name, unique per activity while running.
    pub name: String,
    /// Activity the timer belongs to.
    pub activity_id: Uuid,
    /// Countdown duration in milliseconds.
    pub duration_ms: u64,
}

impl Validate for StartTimerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_label(&self.name) {
            errors.add("name", err);
        }
        if self.duration_ms == 0 {
            let mut err = ValidationError::new("duration_zero");
            err.message = Some("duration must be at least 1 ms".into());
            errors.add("duration_ms", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Payload stopping a named countdown.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StopTimerRequest {
    /// Timer name.
    pub name: String,
    /// Activity the timer belongs to.
    pub activity_id: Uuid,
}

impl Validate for StopTimerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(err) = validate_label(&self.name) {
            errors.add("name", err);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Query parameters accepted by the timer listing endpoint.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimerListQuery {
    /// Restrict to one activity.
    pub activity_id: Option<Uuid>,
}

/// Lifecycle state of a timer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Counting down.
    Running,
    /// Stopped manually before the end time.
    Stopped,
    /// Reached its end time.
    Expired,
}

/// Public projection of a timer run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimerSummary {
    /// Identifier of this run.
    pub id: Uuid,
    /// Timer name.
    pub name: String,
    /// Owning activity.
    pub activity_id: Uuid,
    /// Requested duration in milliseconds.
    pub duration_ms: u64,
    /// Start instant, RFC 3339.
    pub started_at: String,
    /// Natural end instant, RFC 3339.
    pub end_time: String,
    /// Current lifecycle state.
    pub state: TimerState,
}

impl From<TimerEntry> for TimerSummary {
    fn from(entry: TimerEntry) -> Self {
        let state = if entry.running {
            TimerState::Running
        } else if entry.expired {
            TimerState::Expired
        } else {
            TimerState::Stopped
        };

        Self {
            id: entry.id,
            name: entry.name,
            activity_id: entry.activity_id,
            duration_ms: entry.duration.as_millis() as u64,
            started_at: format_timestamp(entry.started_at),
            end_time: format_timestamp(entry.end_time),
            state,
        }
    }
}
