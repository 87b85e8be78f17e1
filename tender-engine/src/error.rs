use tender_core::models::{InvalidScore, InvalidTransition, TenderStatus};
use thiserror::Error;

/// The ways a workflow operation can fail as a whole.
///
/// `E` is the store's error type. Per-item problems, such as an envelope that
/// fails to authenticate during an opening, are not failures: they are flagged
/// on the item and the operation carries on.
///
/// No message carries key material, ciphertext or store internals; the store
/// error is only reachable as the `source()`.
#[derive(Debug, Error)]
pub enum Failure<E> {
    /// The tender's status does not allow the operation
    #[error("cannot {action} a tender that is {status}")]
    InvalidState {
        /// The tender's current status
        status: TenderStatus,
        /// What was attempted
        action: &'static str,
    },

    /// The tender no longer accepts offers
    #[error("the submission deadline has passed")]
    DeadlinePassed,

    /// Absent, deleted, or not owned by the requester. The cases are
    /// deliberately indistinguishable.
    #[error("not found")]
    NotFoundOrForbidden,

    /// Absent or deleted
    #[error("not found")]
    NotFound,

    /// The opening date is still ahead
    #[error("the opening date has not been reached ({seconds_remaining}s remaining)")]
    OpeningNotReached {
        /// Whole seconds until the opening date, rounded up
        seconds_remaining: i64,
    },

    /// A score outside `[0, 100]`
    #[error(transparent)]
    InvalidScore(InvalidScore),

    /// Malformed input
    #[error("validation failed: {0}")]
    Validation(String),

    /// The payload could not be sealed
    #[error("the offer could not be sealed")]
    Sealing,

    /// The store failed
    #[error("store failure")]
    Store(#[source] E),
}

impl<E> Failure<E> {
    /// A stable, machine-readable code for transport mapping.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidState { .. } | Self::DeadlinePassed => "INVALID_STATE",
            Self::NotFoundOrForbidden => "NOT_FOUND_OR_FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::OpeningNotReached { .. } => "OPENING_NOT_REACHED",
            Self::InvalidScore(_) => "INVALID_SCORE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Sealing => "SEALING_FAILED",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    pub(crate) fn invalid_transition(error: InvalidTransition) -> Self {
        Self::InvalidState {
            status: error.from,
            action: error.transition.action(),
        }
    }
}

impl<E> From<E> for Failure<E> {
    fn from(error: E) -> Self {
        Self::Store(error)
    }
}
