//! Offer submission: the financial payload is sealed before it is stored.

use crate::{EngineResult, Failure, audit};
use rust_decimal::Decimal;
use tender_core::{
    models::{
        AuditEntry, EntityType, FinancialPayload, Offer, OfferId, OfferStatus, SupplierId,
        TenderId, TenderStatus,
    },
    ports::{Application, OfferRepository as _, Sealer as _, TenderRepository as _},
};

// Concurrent submissions can pick the same sequence number; the loser retries
// with the next one.
const NUMBERING_ATTEMPTS: u32 = 8;

/// The plaintext offer number of the `sequence`-th offer on a tender.
pub fn offer_number(tender_reference: &str, sequence: u32) -> String {
    format!("OFR-{tender_reference}-{sequence:04}")
}

/// Seal and store a supplier's offer on a published tender.
pub async fn submit_offer<A: Application>(
    app: &A,
    tender_id: TenderId,
    supplier_id: SupplierId,
    payload: FinancialPayload,
) -> EngineResult<Offer, A> {
    let db = app.database();
    let now = app.now();

    let Some(tender) = db.get_tender(tender_id).await?.filter(|t| !t.is_deleted) else {
        return Err(Failure::NotFoundOrForbidden);
    };

    if tender.status != TenderStatus::Published {
        return Err(Failure::InvalidState {
            status: tender.status,
            action: "submit an offer to",
        });
    }
    if tender.is_past_deadline(now) {
        return Err(Failure::DeadlinePassed);
    }
    if payload.total_amount <= Decimal::ZERO {
        return Err(Failure::Validation("total amount must be positive".into()));
    }

    let plaintext = match serde_json::to_vec(&payload) {
        Ok(plaintext) => plaintext,
        Err(error) => {
            tracing::warn!(%tender_id, %error, "failed to serialize financial payload");
            return Err(Failure::Sealing);
        }
    };
    let envelope = match app.sealer().seal(&plaintext) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::warn!(%tender_id, %error, "failed to seal financial payload");
            return Err(Failure::Sealing);
        }
    };

    let mut offer = Offer {
        id: OfferId::new_v4(),
        tender_id,
        supplier_id,
        supplier_name: String::new(),
        offer_number: String::new(),
        status: OfferStatus::Submitted,
        envelope: Some(envelope),
        submitted_at: now,
        technical: None,
        financial: None,
        final_score: None,
        ranking: None,
        evaluation_completed_at: None,
        is_deleted: false,
    };

    let first = db.count_offers(tender_id).await? + 1;
    let mut stored = false;
    for sequence in first..first + NUMBERING_ATTEMPTS {
        offer.offer_number = offer_number(&tender.reference, sequence);
        if db.create_offer(&offer).await? {
            stored = true;
            break;
        }
    }
    if !stored {
        return Err(Failure::Validation(
            "could not allocate an offer number, retry the submission".into(),
        ));
    }

    audit::record(
        app,
        AuditEntry::new(
            None,
            EntityType::Offer,
            offer.id,
            "submit_offer",
            format!(
                "supplier {supplier_id} submitted {} to {}",
                offer.offer_number, tender.reference
            ),
        ),
    )
    .await;

    // Read back for the supplier's display name
    Ok(db.get_offer(offer.id).await?.unwrap_or(offer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_numbers_are_zero_padded() {
        assert_eq!(offer_number("TND-2026-014", 3), "OFR-TND-2026-014-0003");
        assert_eq!(offer_number("T", 12345), "OFR-T-12345");
    }
}
