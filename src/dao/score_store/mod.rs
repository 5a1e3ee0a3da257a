/// In-memory backend used by the binary and the test suite.
pub mod memory;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{Resolution, ScoreEntity, ScoreFilter, ScoreStatus};
use crate::dao::storage::StorageResult;

/// Result of a guarded resolution attempt against a single score record.
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    /// The record was pending and the terminal status was committed.
    Resolved(ScoreEntity),
    /// Another resolution already committed; the stored record is returned so
    /// callers can report which transition won.
    AlreadyResolved(ScoreEntity),
    /// No record with the requested id exists.
    NotFound,
}

/// Abstraction over the persistence layer for score records.
///
/// `mark_resolved` is the only mutation with an atomicity contract: two
/// concurrent calls against the same id must yield exactly one
/// [`ResolveOutcome::Resolved`] and one [`ResolveOutcome::AlreadyResolved`].
pub trait ScoreStore: Send + Sync {
    fn create(&self, score: ScoreEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<ScoreEntity>>>;
    fn list(&self, filter: ScoreFilter) -> BoxFuture<'static, StorageResult<Vec<ScoreEntity>>>;
    fn mark_resolved(
        &self,
        id: Uuid,
        next: ScoreStatus,
        resolution: Resolution,
    ) -> BoxFuture<'static, StorageResult<ResolveOutcome>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
