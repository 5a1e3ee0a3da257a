use std::sync::Mutex;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Key identifying the current timer of an activity: names are unique within
/// an activity scope.
type TimerKey = (Uuid, String);

/// A named, activity-scoped countdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEntry {
    /// Stable identifier of this timer run.
    pub id: Uuid,
    /// Name chosen by the caller, unique per activity while running.
    pub name: String,
    /// Activity the timer belongs to.
    pub activity_id: Uuid,
    /// Requested countdown duration.
    pub duration: Duration,
    /// Start instant.
    pub started_at: OffsetDateTime,
    /// Instant at which the countdown naturally ends.
    pub end_time: OffsetDateTime,
    /// Whether the countdown is still live.
    pub running: bool,
    /// Set when the timer ended by reaching `end_time` rather than by a
    /// manual stop.
    pub expired: bool,
}

/// Error returned when a duplicate timer start is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("timer `{name}` is already running for activity {activity_id}")]
pub struct AlreadyRunning {
    /// Requested timer name.
    pub name: String,
    /// Activity the running timer belongs to.
    pub activity_id: Uuid,
}

/// Result of a stop request.
#[derive(Debug, Clone)]
pub enum StopOutcome {
    /// The running timer was stopped now.
    Stopped(TimerEntry),
    /// The timer had already stopped or expired; stopping is a no-op success.
    AlreadyFinished(TimerEntry),
    /// No timer with that name was ever started for the activity.
    NotFound,
}

/// Registry of activity timers with lazy expiry detection.
///
/// There is no background scheduler: callers sweep on every query, and the
/// sweep flips each newly expired entry exactly once, so the `timer:ended`
/// notification for a given run can never be produced twice.
#[derive(Default)]
pub struct TimerRegistry {
    /// Latest timer per `(activity, name)` pair.
    current: DashMap<TimerKey, TimerEntry>,
    /// Earlier runs displaced by a restart, kept as history.
    completed: Mutex<Vec<TimerEntry>>,
}

impl TimerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a countdown, failing while a timer with the same name is still
    /// running for the activity. A finished previous run is moved to history.
    pub fn start(
        &self,
        name: &str,
        activity_id: Uuid,
        duration: Duration,
        now: OffsetDateTime,
    ) -> Result<TimerEntry, AlreadyRunning> {
        let key = (activity_id, name.to_string());
        let entry = TimerEntry {
            id: Uuid::new_v4(),
            name: name.to_string(),
            activity_id,
            duration,
            started_at: now,
            end_time: now + duration,
            running: true,
            expired: false,
        };

        // The entry guard makes the duplicate check and the insert atomic.
        match self.current.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                let existing = occupied.get();
                if existing.running && now < existing.end_time {
                    return Err(AlreadyRunning {
                        name: name.to_string(),
                        activity_id,
                    });
                }
                let displaced = occupied.insert(entry.clone());
                self.completed
                    .lock()
                    .expect("timer history lock poisoned")
                    .push(displaced);
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(entry.clone());
            }
        }

        Ok(entry)
    }

    /// Stop a timer by name. Stopping an already finished timer succeeds
    /// without touching it; stopping a name never started reports `NotFound`.
    ///
    /// Callers are expected to [`sweep`](Self::sweep) first so an expired
    /// entry is reported as finished rather than stopped.
    pub fn stop(&self, name: &str, activity_id: Uuid, now: OffsetDateTime) -> StopOutcome {
        let key = (activity_id, name.to_string());
        let Some(mut entry) = self.current.get_mut(&key) else {
            return StopOutcome::NotFound;
        };

        if !entry.running || now >= entry.end_time {
            return StopOutcome::AlreadyFinished(entry.clone());
        }

        entry.running = false;
        StopOutcome::Stopped(entry.clone())
    }

    /// Flip every countdown that reached its end time, returning each newly
    /// expired entry exactly once.
    pub fn sweep(&self, now: OffsetDateTime) -> Vec<TimerEntry> {
        let mut newly_expired = Vec::new();
        for mut entry in self.current.iter_mut() {
            if entry.running && now >= entry.end_time {
                entry.running = false;
                entry.expired = true;
                newly_expired.push(entry.clone());
            }
        }
        newly_expired
    }

    /// All timer runs, current and historical, optionally restricted to one
    /// activity, in deterministic order.
    pub fn list(&self, activity_id: Option<Uuid>) -> Vec<TimerEntry> {
        let mut entries: Vec<TimerEntry> = self
            .current
            .iter()
            .map(|entry| entry.value().clone())
            .chain(
                self.completed
                    .lock()
                    .expect("timer history lock poisoned")
                    .iter()
                    .cloned(),
            )
            .filter(|entry| activity_id.is_none_or(|id| entry.activity_id == id))
            .collect();
        entries.sort_by(|a, b| a.started_at.cmp(&b.started_at).then(a.id.cmp(&b.id)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    fn now() -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    #[test]
    fn starting_a_duplicate_running_timer_fails() {
        let registry = TimerRegistry::new();
        let activity = Uuid::new_v4();
        let t0 = now();

        registry.start("quiz", activity, MINUTE, t0).unwrap();
        let err = registry.start("quiz", activity, MINUTE, t0).unwrap_err();
        assert_eq!(err.name, "quiz");

        // Same name under another activity is a different timer.
        registry.start("quiz", Uuid::new_v4(), MINUTE, t0).unwrap();
    }

    #[test]
    fn restart_after_finish_keeps_the_old_run_as_history() {
        let registry = TimerRegistry::new();
        let activity = Uuid::new_v4();
        let t0 = now();

        let first = registry.start("quiz", activity, MINUTE, t0).unwrap();
        registry.sweep(t0 + MINUTE);
        let second = registry
            .start("quiz", activity, MINUTE, t0 + MINUTE * 2)
            .unwrap();
        assert_ne!(first.id, second.id);

        let listed = registry.list(Some(activity));
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
    }

    #[test]
    fn stop_is_idempotent_and_unknown_names_are_reported() {
        let registry = TimerRegistry::new();
        let activity = Uuid::new_v4();
        let t0 = now();

        assert!(matches!(
            registry.stop("quiz", activity, t0),
            StopOutcome::NotFound
        ));

        registry.start("quiz", activity, MINUTE, t0).unwrap();
        let stopped = match registry.stop("quiz", activity, t0 + MINUTE / 2) {
            StopOutcome::Stopped(entry) => entry,
            other => panic!("expected a live stop, got {other:?}"),
        };
        assert!(!stopped.running);
        assert!(!stopped.expired);

        assert!(matches!(
            registry.stop("quiz", activity, t0 + MINUTE),
            StopOutcome::AlreadyFinished(_)
        ));
    }

    #[test]
    fn sweep_reports_each_expiry_exactly_once() {
        let registry = TimerRegistry::new();
        let activity = Uuid::new_v4();
        let t0 = now();

        let timer = registry.start("quiz", activity, MINUTE, t0).unwrap();

        assert!(registry.sweep(t0 + MINUTE / 2).is_empty());

        let expired = registry.sweep(t0 + MINUTE);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, timer.id);
        assert!(expired[0].expired);

        // Repeated queries after the expiry stay silent.
        assert!(registry.sweep(t0 + MINUTE).is_empty());
        assert!(registry.sweep(t0 + MINUTE * 3).is_empty());
    }

    #[test]
    fn manually_stopped_timer_never_expires() {
        let registry = TimerRegistry::new();
        let activity = Uuid::new_v4();
        let t0 = now();

        registry.start("quiz", activity, MINUTE, t0).unwrap();
        registry.stop("quiz", activity, t0);

        assert!(registry.sweep(t0 + MINUTE * 2).is_empty());
        let listed = registry.list(Some(activity));
        assert!(!listed[0].running);
        assert!(!listed[0].expired);
    }
}
