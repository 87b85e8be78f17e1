use crate::models::{Offer, OfferId, RankedOffer, ScoreKind, ScoreRecord, TenderId};
use time::OffsetDateTime;

/// Repository interface for the scores embedded in offers.
pub trait EvaluationRepository: super::Repository {
    /// Overwrite the technical or financial evaluation of an offer.
    ///
    /// Any ranking of the offer's tender was computed from the old score, so
    /// the final scores and ranks of all its offers are cleared in the same
    /// transaction.
    ///
    /// # Returns
    ///
    /// - Ok(true) if the offer exists and is not deleted
    /// - Ok(false) otherwise; nothing was written
    fn record_score(
        &self,
        offer_id: OfferId,
        kind: ScoreKind,
        record: &ScoreRecord,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Replace the tender's ranking with `ranking` in a single transaction,
    /// so a partial ranking is never visible. Offers of the tender that are
    /// not in `ranking` lose any earlier final score and rank.
    fn apply_ranking(
        &self,
        tender_id: TenderId,
        ranking: &[RankedOffer],
        at: OffsetDateTime,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Non-deleted offers of the tender whose evaluation is complete, ordered
    /// by rank ascending.
    fn evaluated_offers(
        &self,
        tender_id: TenderId,
    ) -> impl Future<Output = Result<Vec<Offer>, Self::Error>> + Send;
}
