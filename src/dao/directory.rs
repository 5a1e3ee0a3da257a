use std::collections::HashSet;
use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::storage::StorageResult;

/// Existence checks against the user/team/activity directories.
///
/// Those directories are owned by the surrounding platform; score validation
/// only ever asks whether a referenced id or name is known.
pub trait Directory: Send + Sync {
    fn activity_exists(&self, activity_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn sub_activity_exists(
        &self,
        activity_id: Uuid,
        name: String,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    fn user_exists(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn team_exists(&self, team_id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
}

/// Seedable in-memory directory.
///
/// In `permissive` mode every check passes, which is how the binary runs when
/// the real directories live in another process and referential integrity is
/// enforced upstream. Strict mode backs the test suite.
#[derive(Clone, Default)]
pub struct StaticDirectory {
    inner: Arc<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    permissive: bool,
    activities: DashMap<Uuid, HashSet<String>>,
    users: DashSet<Uuid>,
    teams: DashSet<Uuid>,
}

impl StaticDirectory {
    /// Strict directory that only knows the ids registered on it.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that answers yes to every existence check.
    pub fn permissive() -> Self {
        Self {
            inner: Arc::new(DirectoryInner {
                permissive: true,
                ..DirectoryInner::default()
            }),
        }
    }

    /// Register an activity and its sub-activity names.
    pub fn register_activity(
        &self,
        activity_id: Uuid,
        sub_activities: impl IntoIterator<Item = String>,
    ) {
        self.inner
            .activities
            .insert(activity_id, sub_activities.into_iter().collect());
    }

    /// Register a known user id.
    pub fn register_user(&self, user_id: Uuid) {
        self.inner.users.insert(user_id);
    }

    /// Register a known team id.
    pub fn register_team(&self, team_id: Uuid) {
        self.inner.teams.insert(team_id);
    }
}

impl Directory for StaticDirectory {
    fn activity_exists(&self, activity_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { Ok(inner.permissive || inner.activities.contains_key(&activity_id)) })
    }

    fn sub_activity_exists(
        &self,
        activity_id: Uuid,
        name: String,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            if inner.permissive {
                return Ok(true);
            }
            Ok(inner
                .activities
                .get(&activity_id)
                .is_some_and(|names| names.contains(&name)))
        })
    }

    fn user_exists(&self, user_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { Ok(inner.permissive || inner.users.contains(&user_id)) })
    }

    fn team_exists(&self, team_id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { Ok(inner.permissive || inner.teams.contains(&team_id)) })
    }
}
