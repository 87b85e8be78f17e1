use crate::models::{Offer, OfferId, TenderId};

/// Repository interface for offers.
///
/// Offers are written once at submission. Afterwards only the opening,
/// evaluation and cancellation flows touch them, through the narrower
/// methods of `EvaluationRepository` and `TenderRepository::cancel_tender`.
pub trait OfferRepository: super::Repository {
    /// Insert a freshly sealed offer.
    ///
    /// # Returns
    ///
    /// - Ok(true) if the offer was stored
    /// - Ok(false) if its offer number is already taken for the tender
    fn create_offer(&self, offer: &Offer)
    -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Retrieve an offer, including soft-deleted ones.
    fn get_offer(
        &self,
        offer_id: OfferId,
    ) -> impl Future<Output = Result<Option<Offer>, Self::Error>> + Send;

    /// The number of offers ever submitted to the tender, deleted or not.
    fn count_offers(
        &self,
        tender_id: TenderId,
    ) -> impl Future<Output = Result<u32, Self::Error>> + Send;

    /// Non-deleted offers with status `submitted` or `received`, ordered by
    /// submission time ascending (offer number breaks exact ties).
    fn pending_offers(
        &self,
        tender_id: TenderId,
    ) -> impl Future<Output = Result<Vec<Offer>, Self::Error>> + Send;
}
