/// Guarded score resolution operations.
pub mod approval_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Typed event broadcast helpers, one per fanout event type.
pub mod fanout_events;
/// Health check service.
pub mod health_service;
/// On-demand leaderboard aggregation.
pub mod ranking_service;
/// Score submission and queries.
pub mod score_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Activity timer operations.
pub mod timer_service;
