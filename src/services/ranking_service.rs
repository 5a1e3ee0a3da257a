use indexmap::IndexMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    dao::models::{ScoreContext, ScoreEntity, ScoreFilter, ScoreStatusKind},
    dto::{
        format_timestamp,
        ranking::{RankingEntry, RankingQuery},
    },
    error::ServiceError,
    state::SharedState,
};

/// Compute a leaderboard for the requested scope and period.
///
/// Rankings are recomputed from the approved score set on every call; there
/// is no cache to invalidate. An empty leaderboard is a valid result.
pub async fn rank(
    state: &SharedState,
    query: RankingQuery,
) -> Result<Vec<RankingEntry>, ServiceError> {
    if query.sub_activity.is_some() && query.activity_id.is_none() {
        return Err(ServiceError::InvalidInput(
            "a sub_activity filter requires an activity_id".into(),
        ));
    }

    let store = state.require_score_store().await?;
    let now = OffsetDateTime::now_utc();
    let filter = ScoreFilter {
        activity_id: query.activity_id,
        sub_activity: query.sub_activity,
        status: Some(ScoreStatusKind::Approved),
        created_after: query.period.start(now),
        ..ScoreFilter::default()
    };

    let scores = state.store_op(store.list(filter)).await?;
    Ok(build_ranking(&scores, query.scope))
}

struct Accumulator {
    total: f64,
    count: usize,
    last: OffsetDateTime,
}

/// Aggregate approved scores into ordered leaderboard rows.
///
/// Only scores whose context matches the scope contribute: a team score never
/// credits its submitting member and an individual score never credits a
/// team. Sorting is total descending, then earliest `last_score_at` (the
/// group that reached the total first ranks higher), then subject id, so the
/// output is fully deterministic.
pub fn build_ranking(scores: &[ScoreEntity], scope: ScoreContext) -> Vec<RankingEntry> {
    let mut groups: IndexMap<Uuid, Accumulator> = IndexMap::new();

    for score in scores {
        if score.status.kind() != ScoreStatusKind::Approved || score.context != scope {
            continue;
        }
        let subject_id = match scope {
            ScoreContext::Individual => score.user_id,
            ScoreContext::Team => match score.team_id {
                Some(team_id) => team_id,
                None => continue,
            },
        };

        let group = groups.entry(subject_id).or_insert(Accumulator {
            total: 0.0,
            count: 0,
            last: score.created_at,
        });
        group.total += score.value;
        group.count += 1;
        if score.created_at > group.last {
            group.last = score.created_at;
        }
    }

    let mut rows: Vec<(Uuid, Accumulator)> = groups.into_iter().collect();
    rows.sort_by(|(a_id, a), (b_id, b)| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.last.cmp(&b.last))
            .then_with(|| a_id.cmp(b_id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, (subject_id, group))| RankingEntry {
            subject_id,
            total_score: group.total,
            score_count: group.count,
            average_score: round_to_cents(group.total / group.count as f64),
            last_score_at: format_timestamp(group.last),
            rank: index + 1,
        })
        .collect()
}

/// Round to the 2 decimal places documented for averages.
fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::Duration;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            directory::StaticDirectory,
            models::ScoreStatus,
            score_store::{ScoreStore, memory::MemoryScoreStore},
        },
        dto::ranking::PeriodWindow,
        state::AppState,
    };

    fn approved(
        context: ScoreContext,
        subject: Uuid,
        value: f64,
        created_at: OffsetDateTime,
    ) -> ScoreEntity {
        ScoreEntity {
            id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            sub_activity: None,
            context,
            user_id: match context {
                ScoreContext::Individual => subject,
                ScoreContext::Team => Uuid::new_v4(),
            },
            team_id: match context {
                ScoreContext::Individual => None,
                ScoreContext::Team => Some(subject),
            },
            value,
            max_possible: value.max(100.0),
            status: ScoreStatus::Approved,
            comments: None,
            parent_score_id: None,
            created_at,
            resolution: None,
        }
    }

    #[test]
    fn unapproved_scores_never_contribute() {
        let now = OffsetDateTime::now_utc();
        let user = Uuid::new_v4();
        let mut pending = approved(ScoreContext::Individual, user, 50.0, now);
        pending.status = ScoreStatus::Pending;
        let mut rejected = approved(ScoreContext::Individual, user, 30.0, now);
        rejected.status = ScoreStatus::Rejected {
            reason: "late".into(),
        };
        let counted = approved(ScoreContext::Individual, user, 20.0, now);

        let entries = build_ranking(&[pending, rejected, counted], ScoreContext::Individual);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_score, 20.0);
        assert_eq!(entries[0].score_count, 1);
    }

    #[test]
    fn scope_partition_is_strict_in_both_directions() {
        let now = OffsetDateTime::now_utc();
        let member = Uuid::new_v4();
        let team = Uuid::new_v4();

        let mut team_score = approved(ScoreContext::Team, team, 50.0, now);
        team_score.user_id = member;
        let individual_score = approved(ScoreContext::Individual, member, 30.0, now);
        let scores = vec![team_score, individual_score];

        let team_board = build_ranking(&scores, ScoreContext::Team);
        assert_eq!(team_board.len(), 1);
        assert_eq!(team_board[0].subject_id, team);
        assert_eq!(team_board[0].total_score, 50.0);

        // The submitting member is only credited with their individual score.
        let individual_board = build_ranking(&scores, ScoreContext::Individual);
        assert_eq!(individual_board.len(), 1);
        assert_eq!(individual_board[0].subject_id, member);
        assert_eq!(individual_board[0].total_score, 30.0);
    }

    #[test]
    fn aggregates_sum_count_average_and_latest() {
        let base = OffsetDateTime::now_utc();
        let user = Uuid::new_v4();
        let scores = vec![
            approved(ScoreContext::Individual, user, 80.0, base),
            approved(
                ScoreContext::Individual,
                user,
                45.0,
                base + Duration::minutes(5),
            ),
            approved(
                ScoreContext::Individual,
                user,
                20.0,
                base + Duration::minutes(2),
            ),
        ];

        let entries = build_ranking(&scores, ScoreContext::Individual);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.total_score, 145.0);
        assert_eq!(entry.score_count, 3);
        assert_eq!(entry.average_score, 48.33);
        assert_eq!(
            entry.last_score_at,
            format_timestamp(base + Duration::minutes(5))
        );
    }

    #[test]
    fn ties_break_by_earliest_last_score_then_subject_id() {
        let base = OffsetDateTime::now_utc();
        let slow = Uuid::new_v4();
        let fast = Uuid::new_v4();

        let scores = vec![
            approved(ScoreContext::Individual, fast, 50.0, base),
            approved(
                ScoreContext::Individual,
                slow,
                50.0,
                base + Duration::hours(1),
            ),
        ];
        let entries = build_ranking(&scores, ScoreContext::Individual);
        // Equal totals: whoever reached the total first ranks higher.
        assert_eq!(entries[0].subject_id, fast);
        assert_eq!(entries[0].rank, 1);
        assert_eq!(entries[1].subject_id, slow);
        assert_eq!(entries[1].rank, 2);

        // Full tie falls back to subject id order.
        let twin_a = Uuid::new_v4();
        let twin_b = Uuid::new_v4();
        let scores = vec![
            approved(ScoreContext::Individual, twin_a, 50.0, base),
            approved(ScoreContext::Individual, twin_b, 50.0, base),
        ];
        let entries = build_ranking(&scores, ScoreContext::Individual);
        let expected_first = twin_a.min(twin_b);
        assert_eq!(entries[0].subject_id, expected_first);
        // Ties never share a rank.
        assert_eq!((entries[0].rank, entries[1].rank), (1, 2));
    }

    #[test]
    fn output_is_deterministic_under_input_reordering() {
        let base = OffsetDateTime::now_utc();
        let scores: Vec<ScoreEntity> = (0..6)
            .map(|i| {
                approved(
                    ScoreContext::Individual,
                    Uuid::new_v4(),
                    (i as f64 + 1.0) * 10.0,
                    base + Duration::minutes(i),
                )
            })
            .collect();

        let forward = build_ranking(&scores, ScoreContext::Individual);
        let mut reversed = scores.clone();
        reversed.reverse();
        let backward = build_ranking(&reversed, ScoreContext::Individual);
        assert_eq!(forward, backward);
    }

    #[test]
    fn empty_input_yields_an_empty_board() {
        assert!(build_ranking(&[], ScoreContext::Team).is_empty());
    }

    #[tokio::test]
    async fn rank_applies_the_period_window_and_filters() {
        let state = AppState::new(
            &AppConfig::default(),
            Arc::new(StaticDirectory::permissive()),
        );
        let store = Arc::new(MemoryScoreStore::new());
        state.install_score_store(store.clone()).await;

        let now = OffsetDateTime::now_utc();
        let user = Uuid::new_v4();
        let recent = approved(ScoreContext::Individual, user, 80.0, now - Duration::hours(1));
        let mut stale = approved(ScoreContext::Individual, user, 500.0, now - Duration::days(2));
        stale.activity_id = recent.activity_id;
        store.create(recent.clone()).await.unwrap();
        store.create(stale).await.unwrap();

        let entries = rank(&state, RankingQuery {
            scope: ScoreContext::Individual,
            period: PeriodWindow::Day,
            activity_id: Some(recent.activity_id),
            sub_activity: None,
        })
        .await
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_score, 80.0);

        let all_time = rank(&state, RankingQuery {
            scope: ScoreContext::Individual,
            period: PeriodWindow::All,
            activity_id: None,
            sub_activity: None,
        })
        .await
        .unwrap();
        assert_eq!(all_time[0].total_score, 580.0);
        assert_eq!(all_time[0].score_count, 2);
    }

    #[tokio::test]
    async fn sub_activity_filter_requires_an_activity() {
        let state = AppState::new(
            &AppConfig::default(),
            Arc::new(StaticDirectory::permissive()),
        );
        state
            .install_score_store(Arc::new(MemoryScoreStore::new()))
            .await;

        let result = rank(&state, RankingQuery {
            scope: ScoreContext::Team,
            period: PeriodWindow::All,
            activity_id: None,
            sub_activity: Some("sprint".into()),
        })
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn scenario_pending_then_approved_enters_the_board() {
        let now = OffsetDateTime::now_utc();
        let user = Uuid::new_v4();
        let mut score = approved(ScoreContext::Individual, user, 80.0, now);
        score.status = ScoreStatus::Pending;

        assert!(build_ranking(std::slice::from_ref(&score), ScoreContext::Individual).is_empty());

        score.status = ScoreStatus::Approved;
        let entries = build_ranking(std::slice::from_ref(&score), ScoreContext::Individual);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject_id, user);
        assert_eq!(entries[0].total_score, 80.0);
        assert_eq!(entries[0].score_count, 1);
        assert_eq!(entries[0].average_score, 80.0);
    }
}
