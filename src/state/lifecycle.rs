use thiserror::Error;

use crate::dao::models::{ScoreStatus, ScoreStatusKind};

/// Moderator decision driving a pending score to a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionAction {
    /// Accept the score.
    Approve,
    /// Refuse the score with a reason shown to the submitter.
    Reject {
        /// Mandatory, non-empty explanation.
        reason: String,
    },
}

impl ResolutionAction {
    /// Terminal status this action drives a pending score to.
    pub fn target_status(&self) -> ScoreStatus {
        match self {
            ResolutionAction::Approve => ScoreStatus::Approved,
            ResolutionAction::Reject { reason } => ScoreStatus::Rejected {
                reason: reason.clone(),
            },
        }
    }

    /// Short verb used in conflict messages.
    fn verb(&self) -> &'static str {
        match self {
            ResolutionAction::Approve => "approve",
            ResolutionAction::Reject { .. } => "reject",
        }
    }
}

/// Error returned when a resolution is attempted against a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} a score that was already resolved as {from:?}")]
pub struct InvalidTransition {
    /// Status the score was in when the action arrived.
    pub from: ScoreStatusKind,
    /// Verb of the refused action.
    pub action: &'static str,
}

/// Compute the status a score moves to when `action` is applied.
///
/// The lifecycle is `Pending -> Approved | Rejected`, both terminal; no
/// transition ever leaves a terminal state. The store enforces this guard
/// atomically; this table is the single source of the rule and of the
/// wording reported back to racing moderators.
pub fn resolve(
    current: &ScoreStatus,
    action: &ResolutionAction,
) -> Result<ScoreStatus, InvalidTransition> {
    match current {
        ScoreStatus::Pending => Ok(action.target_status()),
        terminal => Err(InvalidTransition {
            from: terminal.kind(),
            action: action.verb(),
        }),
    }
}
