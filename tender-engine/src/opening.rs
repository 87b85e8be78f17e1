//! Opening sealed offers once a tender's opening date is reached.

use crate::{EngineResult, Failure, StoreError, audit, managed_tender, report};
use tender_core::{
    models::{AuditEntry, EntityType, FinancialPayload, Offer, OpenedOffer, ReportKind, Tender, TenderId, UserId},
    ports::{Application, OfferRepository as _, Sealer},
};
use time::OffsetDateTime;

/// The single gate in front of every unsealing: the opening date must have
/// been reached, whatever the tender's status.
pub fn can_open<E>(tender: &Tender, now: OffsetDateTime) -> Result<(), Failure<E>> {
    match tender.seconds_until_opening(now) {
        None => Ok(()),
        Some(seconds_remaining) => Err(Failure::OpeningNotReached { seconds_remaining }),
    }
}

/// Unseal the pending offers of a tender the requester owns.
///
/// Offers come back in submission order. An offer whose envelope fails to
/// authenticate (or does not hold a valid payload) stays in the result with
/// `decryption_failed` set. Nothing stored is modified, so opening again
/// returns the same offers; the first opening also writes the tender's
/// opening report, later ones find it on record.
pub async fn open_offers<A: Application>(
    app: &A,
    tender_id: TenderId,
    requester: UserId,
) -> EngineResult<Vec<OpenedOffer>, A> {
    let tender = managed_tender(app, tender_id, requester).await?;
    can_open::<StoreError<A>>(&tender, app.now())?;

    let offers: Vec<OpenedOffer> = app
        .database()
        .pending_offers(tender.id)
        .await?
        .into_iter()
        .map(|offer| unseal(app.sealer(), offer))
        .collect();

    let failed = offers.iter().filter(|o| o.decryption_failed).count();
    report::generate(app, tender.id, Some(requester), ReportKind::Opening, &offers).await?;

    audit::record(
        app,
        AuditEntry::new(
            Some(requester),
            EntityType::Tender,
            tender.id,
            "open_offers",
            format!("opened {} offers, {failed} failed decryption", offers.len()),
        ),
    )
    .await;

    Ok(offers)
}

fn unseal<S: Sealer>(sealer: &S, offer: Offer) -> OpenedOffer {
    let Some(envelope) = offer.envelope.as_ref() else {
        return OpenedOffer::sealed(offer);
    };

    let payload = match sealer.unseal(envelope) {
        Ok(plaintext) => serde_json::from_slice::<FinancialPayload>(&plaintext).map_err(|error| {
            tracing::warn!(offer_id = %offer.id, %error, "unsealed payload is not a financial payload");
        }),
        Err(error) => {
            tracing::warn!(offer_id = %offer.id, key_id = %envelope.key_id, %error, "offer failed to unseal");
            Err(())
        }
    };

    match payload {
        Ok(financial) => OpenedOffer::unsealed(offer, financial),
        Err(()) => OpenedOffer::failed(offer),
    }
}
