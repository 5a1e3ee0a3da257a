use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status, `ok` or `degraded`.
    pub status: String,
    /// Whether the service currently runs without a score store.
    pub degraded: bool,
}

impl HealthResponse {
    /// Health response for a fully operational service.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            degraded: false,
        }
    }

    /// Health response while no score store is installed.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            degraded: true,
        }
    }
}
