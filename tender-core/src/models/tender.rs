use super::{TenderId, UserId};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;
use time::OffsetDateTime;

/// The lifecycle status of a tender.
///
/// A tender moves `draft -> published -> closed`. While it is still open
/// (`draft`, `published` or `in_progress`) it may instead be `cancelled`.
/// `closed` and `cancelled` are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenderStatus {
    /// Being prepared by the buyer, invisible to suppliers
    Draft,
    /// Accepting offers until the deadline
    Published,
    /// Open but under administrative review
    InProgress,
    /// Past the deadline; offers can be opened once the opening date is reached
    Closed,
    /// Terminated outside the deadline path
    Cancelled,
}

impl TenderStatus {
    /// The stored representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition may leave this status
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }

    /// Validate `transition` against the current status, returning the status
    /// the tender moves into.
    pub fn apply(self, transition: Transition) -> Result<Self, InvalidTransition> {
        if transition.allowed_from().contains(&self) {
            Ok(transition.target())
        } else {
            Err(InvalidTransition {
                from: self,
                transition,
            })
        }
    }
}

impl fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a status string that does not name a known status.
#[derive(Debug, Error)]
#[error("unknown status `{0}`")]
pub struct UnknownStatus(pub String);

impl FromStr for TenderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// The legal lifecycle transitions of a tender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// `draft -> published`
    Publish,
    /// `published -> closed`
    Close,
    /// `draft | published | in_progress -> cancelled`
    Cancel,
}

impl Transition {
    /// The statuses this transition may start from
    pub fn allowed_from(&self) -> &'static [TenderStatus] {
        match self {
            Self::Publish => &[TenderStatus::Draft],
            Self::Close => &[TenderStatus::Published],
            Self::Cancel => &[
                TenderStatus::Draft,
                TenderStatus::Published,
                TenderStatus::InProgress,
            ],
        }
    }

    /// The status this transition ends in
    pub fn target(&self) -> TenderStatus {
        match self {
            Self::Publish => TenderStatus::Published,
            Self::Close => TenderStatus::Closed,
            Self::Cancel => TenderStatus::Cancelled,
        }
    }

    /// The verb recorded in the audit log
    pub fn action(&self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Close => "close",
            Self::Cancel => "cancel",
        }
    }
}

/// A transition was attempted from a status that does not permit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {} a tender that is {from}", .transition.action())]
pub struct InvalidTransition {
    /// The status the tender was in
    pub from: TenderStatus,
    /// The rejected transition
    pub transition: Transition,
}

/// A tender published by a buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tender {
    /// The tender's identifier
    pub id: TenderId,
    /// Human-readable reference number, e.g. `TND-2026-0042`
    pub reference: String,
    /// Title shown to suppliers
    pub title: String,
    /// The buyer who owns the tender
    pub buyer_id: UserId,
    /// Current lifecycle status
    pub status: TenderStatus,
    /// Submission cutoff
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// Instant from which sealed offers may be revealed (never before `deadline`)
    #[serde(with = "time::serde::rfc3339")]
    pub opening_date: OffsetDateTime,
    /// When the tender was published
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
    /// When the tender was closed
    #[serde(with = "time::serde::rfc3339::option")]
    pub closed_at: Option<OffsetDateTime>,
    /// When the tender was cancelled
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
    /// Why the tender was cancelled
    pub cancellation_reason: Option<String>,
    /// Soft-delete flag; deleted tenders behave as if they did not exist
    pub is_deleted: bool,
    /// Creation time
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Last modification time
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Tender {
    /// Seconds left until the opening date, or `None` once it is reached.
    ///
    /// Partial seconds round up, so a caller told "0 seconds" is never early.
    pub fn seconds_until_opening(&self, now: OffsetDateTime) -> Option<i64> {
        if now >= self.opening_date {
            None
        } else {
            let remaining = self.opening_date - now;
            let whole = remaining.whole_seconds();
            Some(if remaining.subsec_nanoseconds() > 0 {
                whole + 1
            } else {
                whole
            })
        }
    }

    /// Whether submissions are closed at `now`
    pub fn is_past_deadline(&self, now: OffsetDateTime) -> bool {
        now >= self.deadline
    }
}

/// Read-only projection of a tender's cancellation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationStatus {
    /// The tender
    pub tender_id: TenderId,
    /// Its current status
    pub status: TenderStatus,
    /// The reason given at cancellation, if cancelled
    pub cancellation_reason: Option<String>,
    /// When it was cancelled, if cancelled
    #[serde(with = "time::serde::rfc3339::option")]
    pub cancelled_at: Option<OffsetDateTime>,
}

impl From<&Tender> for CancellationStatus {
    fn from(tender: &Tender) -> Self {
        Self {
            tender_id: tender.id,
            status: tender.status,
            cancellation_reason: tender.cancellation_reason.clone(),
            cancelled_at: tender.cancelled_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use time::macros::datetime;

    #[rstest]
    #[case(TenderStatus::Draft, Transition::Publish, Some(TenderStatus::Published))]
    #[case(TenderStatus::Published, Transition::Publish, None)]
    #[case(TenderStatus::Closed, Transition::Publish, None)]
    #[case(TenderStatus::Published, Transition::Close, Some(TenderStatus::Closed))]
    #[case(TenderStatus::Draft, Transition::Close, None)]
    #[case(TenderStatus::Cancelled, Transition::Close, None)]
    #[case(TenderStatus::Draft, Transition::Cancel, Some(TenderStatus::Cancelled))]
    #[case(TenderStatus::Published, Transition::Cancel, Some(TenderStatus::Cancelled))]
    #[case(TenderStatus::InProgress, Transition::Cancel, Some(TenderStatus::Cancelled))]
    #[case(TenderStatus::Closed, Transition::Cancel, None)]
    #[case(TenderStatus::Cancelled, Transition::Cancel, None)]
    fn transitions(
        #[case] from: TenderStatus,
        #[case] transition: Transition,
        #[case] expected: Option<TenderStatus>,
    ) {
        assert_eq!(from.apply(transition).ok(), expected);
    }

    #[test]
    fn terminal_states_have_no_exit() {
        for status in [TenderStatus::Closed, TenderStatus::Cancelled] {
            assert!(status.is_terminal());
            for transition in [Transition::Publish, Transition::Close, Transition::Cancel] {
                assert!(status.apply(transition).is_err());
            }
        }
    }

    #[test]
    fn invalid_transition_names_current_status() {
        let err = TenderStatus::Closed.apply(Transition::Cancel).unwrap_err();
        assert_eq!(err.to_string(), "cannot cancel a tender that is closed");
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            TenderStatus::Draft,
            TenderStatus::Published,
            TenderStatus::InProgress,
            TenderStatus::Closed,
            TenderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<TenderStatus>().unwrap(), status);
        }
        assert!("awarded".parse::<TenderStatus>().is_err());
    }

    #[test]
    fn seconds_until_opening_rounds_up() {
        let opening = datetime!(2026-03-01 12:00 UTC);
        let tender = Tender {
            id: TenderId::new_v4(),
            reference: "TND-1".into(),
            title: "Road resurfacing".into(),
            buyer_id: UserId::new_v4(),
            status: TenderStatus::Closed,
            deadline: opening,
            opening_date: opening,
            published_at: None,
            closed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            is_deleted: false,
            created_at: opening,
            updated_at: opening,
        };

        assert_eq!(
            tender.seconds_until_opening(opening - time::Duration::minutes(30)),
            Some(1800)
        );
        assert_eq!(
            tender.seconds_until_opening(opening - time::Duration::milliseconds(1)),
            Some(1)
        );
        assert_eq!(tender.seconds_until_opening(opening), None);
    }
}
