use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    models::{Resolution, ScoreEntity, ScoreFilter, ScoreStatus},
    score_store::{ResolveOutcome, ScoreStore},
    storage::StorageResult,
};

/// Record wrapper carrying the optimistic version counter.
#[derive(Debug, Clone)]
struct VersionedScore {
    entity: ScoreEntity,
    /// Bumped on every mutation of the record.
    version: u64,
}

/// Process-local score store backed by a concurrent map.
///
/// Resolution runs under the exclusive entry guard of the map shard, so two
/// concurrent `mark_resolved` calls against the same id serialize: the first
/// commits, the second observes a terminal status and reports it.
#[derive(Default)]
pub struct MemoryScoreStore {
    scores: Arc<DashMap<Uuid, VersionedScore>>,
}

impl MemoryScoreStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version of a record, exposed for concurrency assertions.
    pub fn version_of(&self, id: Uuid) -> Option<u64> {
        self.scores.get(&id).map(|entry| entry.version)
    }
}

impl ScoreStore for MemoryScoreStore {
    fn create(&self, score: ScoreEntity) -> BoxFuture<'static, StorageResult<()>> {
        let scores = Arc::clone(&self.scores);
        Box::pin(async move {
            scores.insert(score.id, VersionedScore {
                entity: score,
                version: 0,
            });
            Ok(())
        })
    }

    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>> {
        let scores = Arc::clone(&self.scores);
        Box::pin(async move { Ok(scores.get(&id).map(|entry| entry.entity.clone())) })
    }

    fn list(&self, filter: ScoreFilter) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>> {
        let scores = Arc::clone(&self.scores);
        Box::pin(async move {
            let mut matching: Vec<ScoreEntity> = scores
                .iter()
                .filter(|entry| filter.matches(&entry.entity))
                .map(|entry| entry.entity.clone())
                .collect();
            // Deterministic listing order regardless of map iteration order.
            matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            Ok(matching)
        })
    }

    fn mark_resolved(
        &self,
        id: Uuid,
        next: ScoreStatus,
        resolution: Resolution,
    ) -> BoxFuture<'static, StorageResult<ResolveOutcome>> {
        let scores = Arc::clone(&self.scores);
        Box::pin(async move {
            // `get_mut` holds the shard write lock for the whole read-check-write,
            // which is the atomicity guarantee resolution relies on.
            let Some(mut entry) = scores.get_mut(&id) else {
                return Ok(ResolveOutcome::NotFound);
            };

            if entry.entity.status.is_terminal() {
                return Ok(ResolveOutcome::AlreadyResolved(entry.entity.clone()));
            }

            entry.entity.status = next;
            entry.entity.resolution = Some(resolution);
            entry.version += 1;
            Ok(ResolveOutcome::Resolved(entry.entity.clone()))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use time::OffsetDateTime;

    use super::*;
    use crate::dao::models::{ScoreContext, ScoreStatusKind};

    fn pending_score() -> ScoreEntity {
        ScoreEntity {
            id: Uuid::new_v4(),
            activity_id: Uuid::new_v4(),
            sub_activity: None,
            context: ScoreContext::Individual,
            user_id: Uuid::new_v4(),
            team_id: None,
            value: 80.0,
            max_possible: 100.0,
            status: ScoreStatus::Pending,
            comments: None,
            parent_score_id: None,
            created_at: OffsetDateTime::now_utc(),
            resolution: None,
        }
    }

    fn resolution(by: Uuid) -> Resolution {
        Resolution {
            resolved_by: by,
            resolved_at: OffsetDateTime::now_utc(),
            comments: None,
        }
    }

    #[tokio::test]
    async fn create_then_find_round_trips() {
        let store = MemoryScoreStore::new();
        let score = pending_score();
        store.create(score.clone()).await.unwrap();

        let found = store.find(score.id).await.unwrap().unwrap();
        assert_eq!(found, score);
        assert_eq!(store.version_of(score.id), Some(0));
    }

    #[tokio::test]
    async fn find_unknown_id_is_none() {
        let store = MemoryScoreStore::new();
        assert!(store.find(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_applies_filter_and_orders_by_creation() {
        let store = MemoryScoreStore::new();
        let base = OffsetDateTime::now_utc();

        let mut first = pending_score();
        first.created_at = base;
        let mut second = pending_score();
        second.created_at = base + time::Duration::seconds(5);
        second.status = ScoreStatus::Approved;

        store.create(second.clone()).await.unwrap();
        store.create(first.clone()).await.unwrap();

        let all = store.list(ScoreFilter::default()).await.unwrap();
        assert_eq!(
            all.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );

        let approved = store
            .list(ScoreFilter {
                status: Some(ScoreStatusKind::Approved),
                ..ScoreFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, second.id);
    }

    #[tokio::test]
    async fn resolution_commits_once_and_bumps_version() {
        let store = MemoryScoreStore::new();
        let score = pending_score();
        store.create(score.clone()).await.unwrap();

        let admin = Uuid::new_v4();
        let outcome = store
            .mark_resolved(score.id, ScoreStatus::Approved, resolution(admin))
            .await
            .unwrap();
        let resolved = match outcome {
            ResolveOutcome::Resolved(entity) => entity,
            other => panic!("expected resolution to commit, got {other:?}"),
        };
        assert_eq!(resolved.status, ScoreStatus::Approved);
        assert_eq!(resolved.resolution.as_ref().unwrap().resolved_by, admin);
        assert_eq!(store.version_of(score.id), Some(1));

        let second = store
            .mark_resolved(
                score.id,
                ScoreStatus::Rejected {
                    reason: "late".into(),
                },
                resolution(Uuid::new_v4()),
            )
            .await
            .unwrap();
        match second {
            ResolveOutcome::AlreadyResolved(entity) => {
                assert_eq!(entity.status, ScoreStatus::Approved)
            }
            other => panic!("expected conflict outcome, got {other:?}"),
        }
        // The losing attempt must not touch the record.
        assert_eq!(store.version_of(score.id), Some(1));
    }

    #[tokio::test]
    async fn resolving_unknown_id_reports_not_found() {
        let store = MemoryScoreStore::new();
        let outcome = store
            .mark_resolved(
                Uuid::new_v4(),
                ScoreStatus::Approved,
                resolution(Uuid::new_v4()),
            )
            .await
            .unwrap();
        assert!(matches!(outcome, ResolveOutcome::NotFound));
    }

    #[tokio::test]
    async fn concurrent_resolutions_yield_one_winner() {
        let store = Arc::new(MemoryScoreStore::new());
        let score = pending_score();
        store.create(score.clone()).await.unwrap();

        let approve = {
            let store = Arc::clone(&store);
            let id = score.id;
            tokio::spawn(async move {
                store
                    .mark_resolved(id, ScoreStatus::Approved, resolution(Uuid::new_v4()))
                    .await
                    .unwrap()
            })
        };
        let reject = {
            let store = Arc::clone(&store);
            let id = score.id;
            tokio::spawn(async move {
                store
                    .mark_resolved(
                        id,
                        ScoreStatus::Rejected {
                            reason: "duplicate submission".into(),
                        },
                        resolution(Uuid::new_v4()),
                    )
                    .await
                    .unwrap()
            })
        };

        let outcomes = [approve.await.unwrap(), reject.await.unwrap()];
        let resolved = outcomes
            .iter()
            .filter(|o| matches!(o, ResolveOutcome::Resolved(_)))
            .count();
        let conflicted = outcomes
            .iter()
            .filter(|o| matches!(o, ResolveOutcome::AlreadyResolved(_)))
            .count();
        assert_eq!((resolved, conflicted), (1, 1));

        // The stored status matches whichever transition committed first.
        let stored = store.find(score.id).await.unwrap().unwrap();
        let winner = outcomes
            .iter()
            .find_map(|o| match o {
                ResolveOutcome::Resolved(entity) => Some(entity.status.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(stored.status, winner);
        assert_eq!(store.version_of(score.id), Some(1));
    }
}
