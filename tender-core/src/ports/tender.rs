use crate::models::{SupplierId, Tender, TenderId, Transition};
use time::OffsetDateTime;

/// Repository interface for tenders and their status transitions.
///
/// Every status change is a conditional update: it only applies if the
/// tender is still in one of the statuses the transition may start from.
/// This makes overlapping scheduler ticks, or several scheduler instances,
/// safe without any distributed lock.
pub trait TenderRepository: super::Repository {
    /// Insert a new tender.
    fn create_tender(
        &self,
        tender: &Tender,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Retrieve a tender, including soft-deleted ones.
    fn get_tender(
        &self,
        tender_id: TenderId,
    ) -> impl Future<Output = Result<Option<Tender>, Self::Error>> + Send;

    /// Apply `transition` if, and only if, the tender's current status is one
    /// of `transition.allowed_from()` and it is not soft-deleted.
    ///
    /// # Returns
    ///
    /// - Ok(true) if this call moved the tender
    /// - Ok(false) if the tender was absent or no longer in an allowed status
    /// - Err otherwise
    fn transition_tender(
        &self,
        tender_id: TenderId,
        transition: Transition,
        at: OffsetDateTime,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Cancel a tender and cascade to its offers, atomically.
    ///
    /// The status guard is the same as `transition_tender` with
    /// `Transition::Cancel`. Every non-deleted offer of the tender is marked
    /// `cancelled` and soft-deleted in the same transaction.
    ///
    /// # Returns
    ///
    /// - Ok(Some(suppliers)) with the suppliers of the cascaded offers
    /// - Ok(None) if the guard did not match; nothing was written
    fn cancel_tender(
        &self,
        tender_id: TenderId,
        reason: &str,
        at: OffsetDateTime,
    ) -> impl Future<Output = Result<Option<Vec<SupplierId>>, Self::Error>> + Send;

    /// Published, non-deleted tenders whose deadline is before `now`, oldest
    /// deadline first, at most `limit` of them.
    fn due_tenders(
        &self,
        now: OffsetDateTime,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Tender>, Self::Error>> + Send;
}
