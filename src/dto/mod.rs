use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Realtime event payloads and the closed event type set.
pub mod events;
/// Health check payloads.
pub mod health;
/// Authenticated caller identity supplied by the auth collaborator.
pub mod identity;
/// Ranking query parameters and entries.
pub mod ranking;
/// Score submission, resolution, and listing payloads.
pub mod score;
/// Timer payloads.
pub mod timer;
/// Validation helpers for DTOs.
pub mod validation;

pub(crate) fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
