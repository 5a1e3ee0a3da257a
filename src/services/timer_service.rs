use std::time::Duration;

use time::OffsetDateTime;
use validator::Validate;

use crate::{
    dto::timer::{StartTimerRequest, StopTimerRequest, TimerListQuery, TimerSummary},
    error::ServiceError,
    services::fanout_events,
    state::{SharedState, timers::StopOutcome},
};

/// Start a named countdown for an activity.
///
/// Fails with a conflict while a timer with the same name is still running
/// for that activity.
pub async fn start_timer(
    state: &SharedState,
    request: StartTimerRequest,
) -> Result<TimerSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

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

    let now = OffsetDateTime::now_utc();
    sweep_expired(state, now);

    state
        .timers()
        .start(
            &request.name,
            request.activity_id,
            Duration::from_millis(request.duration_ms),
            now,
        )
        .map(Into::into)
        .map_err(|err| ServiceError::Conflict(err.to_string()))
}

/// Stop a named countdown. Stopping an already finished timer is a no-op
/// success; a never-started name is reported as not found.
pub async fn stop_timer(
    state: &SharedState,
    request: StopTimerRequest,
) -> Result<TimerSummary, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))?;

    let now = OffsetDateTime::now_utc();
    sweep_expired(state, now);

    match state.timers().stop(&request.name, request.activity_id, now) {
        StopOutcome::Stopped(entry) | StopOutcome::AlreadyFinished(entry) => Ok(entry.into()),
        StopOutcome::NotFound => Err(ServiceError::NotFound(format!(
            "no timer named `{}` for activity `{}`",
            request.name, request.activity_id
        ))),
    }
}

/// List timer runs, current and historical.
pub async fn list_timers(state: &SharedState, query: TimerListQuery) -> Vec<TimerSummary> {
    sweep_expired(state, OffsetDateTime::now_utc());
    state
        .timers()
        .list(query.activity_id)
        .into_iter()
        .map(Into::into)
        .collect()
}

/// Lazy expiry detection: every registry-touching call sweeps first, and each
/// newly expired run is announced exactly once.
fn sweep_expired(state: &SharedState, now: OffsetDateTime) {
    for entry in state.timers().sweep(now) {
        fanout_events::broadcast_timer_ended(state, &entry);
    }
}
