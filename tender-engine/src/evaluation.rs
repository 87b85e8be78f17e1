//! Scoring opened offers and computing the advisory ranking.
//!
//! The final score is the mean of the technical and financial scores, rounded
//! to two decimals. Ranking is advisory: nothing here awards or rejects an
//! offer.

use crate::{
    EngineResult, Failure, StoreError, audit, live_tender, managed_tender, opening::can_open,
};
use tender_core::{
    models::{
        AuditEntry, EntityType, Offer, OfferId, RankedOffer, Score, ScoreKind, ScoreRecord,
        TenderId, UserId, rank,
    },
    ports::{
        Application, EvaluationRepository as _, OfferRepository as _, TenderRepository as _,
    },
};

/// Record the technical evaluation of an offer.
pub async fn record_technical<A: Application>(
    app: &A,
    offer_id: OfferId,
    score: f64,
    comments: Option<String>,
    evaluator_id: UserId,
) -> EngineResult<Offer, A> {
    record(app, offer_id, ScoreKind::Technical, score, comments, evaluator_id).await
}

/// Record the financial evaluation of an offer.
pub async fn record_financial<A: Application>(
    app: &A,
    offer_id: OfferId,
    score: f64,
    comments: Option<String>,
    evaluator_id: UserId,
) -> EngineResult<Offer, A> {
    record(app, offer_id, ScoreKind::Financial, score, comments, evaluator_id).await
}

async fn record<A: Application>(
    app: &A,
    offer_id: OfferId,
    kind: ScoreKind,
    score: f64,
    comments: Option<String>,
    evaluator_id: UserId,
) -> EngineResult<Offer, A> {
    let score = match Score::try_from(score) {
        Ok(score) => score,
        Err(invalid) => return Err(Failure::InvalidScore(invalid)),
    };
    let db = app.database();

    let Some(offer) = db.get_offer(offer_id).await?.filter(|o| !o.is_deleted) else {
        return Err(Failure::NotFound);
    };

    // An offer is only scored by someone entitled to, and never before it
    // could have been opened
    let Some(tender) = db.get_tender(offer.tender_id).await?.filter(|t| !t.is_deleted) else {
        return Err(Failure::NotFound);
    };
    if !app.can_evaluate(evaluator_id, &tender).await {
        return Err(Failure::NotFoundOrForbidden);
    }
    can_open::<StoreError<A>>(&tender, app.now())?;

    let record = ScoreRecord {
        score: score.value(),
        comments,
        evaluator_id,
        evaluated_at: app.now(),
    };
    if !db.record_score(offer_id, kind, &record).await? {
        return Err(Failure::NotFound);
    }

    audit::record(
        app,
        AuditEntry::new(
            Some(evaluator_id),
            EntityType::Offer,
            offer_id,
            kind.action(),
            format!("{} scored {}", offer.offer_number, record.score),
        ),
    )
    .await;

    db.get_offer(offer_id).await?.ok_or(Failure::NotFound)
}

/// Rank the fully scored pending offers of a tender the buyer owns.
///
/// Offers missing either score are left out. Ties keep submission order. The
/// scores and ranks of the whole batch are persisted in one transaction.
pub async fn calculate_final_scores<A: Application>(
    app: &A,
    tender_id: TenderId,
    buyer_id: UserId,
) -> EngineResult<Vec<RankedOffer>, A> {
    let tender = managed_tender(app, tender_id, buyer_id).await?;
    let db = app.database();

    let offers = db.pending_offers(tender.id).await?;
    let ranking = rank(&offers);
    db.apply_ranking(tender.id, &ranking, app.now()).await?;

    audit::record(
        app,
        AuditEntry::new(
            Some(buyer_id),
            EntityType::Tender,
            tender.id,
            "calculate_final_scores",
            format!(
                "ranked {} of {} pending offers",
                ranking.len(),
                offers.len()
            ),
        ),
    )
    .await;

    Ok(ranking)
}

/// The evaluated offers of a tender, best rank first.
pub async fn evaluation_summary<A: Application>(
    app: &A,
    tender_id: TenderId,
) -> EngineResult<Vec<Offer>, A> {
    let tender = live_tender(app, tender_id).await?;
    Ok(app.database().evaluated_offers(tender.id).await?)
}
