use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::dao::models::ScoreContext;

/// Rolling period used to filter which approved scores count toward a
/// ranking. Every window is half-open and ends now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeriodWindow {
    /// Last 24 hours.
    Day,
    /// Last 7 days.
    Week,
    /// Last 30 days.
    Month,
    /// Last 365 days.
    Year,
    /// All-time, no lower bound.
    All,
}

impl PeriodWindow {
    /// Inclusive lower bound of the window ending at `now`; `None` for
    /// all-time.
    pub fn start(self, now: OffsetDateTime) -> Option<OffsetDateTime> {
        let length = match self {
            PeriodWindow::Day => Duration::days(1),
            PeriodWindow::Week => Duration::days(7),
            PeriodWindow::Month => Duration::days(30),
            PeriodWindow::Year => Duration::days(365),
            PeriodWindow::All => return None,
        };
        Some(now - length)
    }
}

/// Query parameters accepted by the ranking endpoint.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankingQuery {
    /// Grouping dimension: individual or team leaderboard.
    pub scope: ScoreContext,
    /// Period window restricting which scores count.
    pub period: PeriodWindow,
    /// Restrict to one activity.
    #[serde(default)]
    pub activity_id: Option<Uuid>,
    /// Restrict to one sub-activity; requires `activity_id`.
    #[serde(default)]
    pub sub_activity: Option<String>,
}

/// One leaderboard row. Ranks are 1-based and strictly positional: ties in
/// `total_score` are broken by earliest `last_score_at`, then by subject id.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RankingEntry {
    /// User or team the row aggregates, depending on the query scope.
    pub subject_id: Uuid,
    /// Sum of approved score values in the window.
    pub total_score: f64,
    /// Number of approved scores in the window.
    pub score_count: usize,
    /// `total_score / score_count`, rounded to 2 decimal places.
    pub average_score: f64,
    /// Creation instant of the newest counted score, RFC 3339.
    pub last_score_at: String,
    /// 1-based position after sorting.
    pub rank: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_are_rolling_and_end_now() {
        let now = OffsetDateTime::now_utc();
        assert_eq!(PeriodWindow::Day.start(now), Some(now - Duration::days(1)));
        assert_eq!(PeriodWindow::Week.start(now), Some(now - Duration::days(7)));
        assert_eq!(
            PeriodWindow::Month.start(now),
            Some(now - Duration::days(30))
        );
        assert_eq!(
            PeriodWindow::Year.start(now),
            Some(now - Duration::days(365))
        );
        assert_eq!(PeriodWindow::All.start(now), None);
    }

    #[test]
    fn period_parses_from_lowercase_names() {
        let period: PeriodWindow = serde_json::from_str("\"week\"").unwrap();
        assert_eq!(period, PeriodWindow::Week);
        assert!(serde_json::from_str::<PeriodWindow>("\"fortnight\"").is_err());
    }
}
