#![allow(dead_code)]

use tender_core::models::{
    Offer, OfferId, OfferStatus, Participant, SealedEnvelope, SupplierId, Tender, TenderId,
    TenderStatus, UserId,
};
use tender_sqlite::{Db, config::SqliteConfig};
use time::{Duration, OffsetDateTime, macros::datetime};

pub const NOW: OffsetDateTime = datetime!(2026-03-01 12:00:00 UTC);

pub async fn db() -> anyhow::Result<Db> {
    Ok(Db::open(&SqliteConfig::default()).await?)
}

pub fn tender(reference: &str, status: TenderStatus, deadline: OffsetDateTime) -> Tender {
    Tender {
        id: TenderId::new_v4(),
        reference: reference.to_owned(),
        title: format!("Supply of office furniture ({reference})"),
        buyer_id: UserId::new_v4(),
        status,
        deadline,
        opening_date: deadline + Duration::hours(1),
        published_at: None,
        closed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        is_deleted: false,
        created_at: NOW - Duration::days(7),
        updated_at: NOW - Duration::days(7),
    }
}

pub fn offer(
    tender: &Tender,
    supplier_id: SupplierId,
    offer_number: &str,
    submitted_at: OffsetDateTime,
) -> Offer {
    Offer {
        id: OfferId::new_v4(),
        tender_id: tender.id,
        supplier_id,
        supplier_name: String::new(),
        offer_number: offer_number.to_owned(),
        status: OfferStatus::Submitted,
        envelope: Some(SealedEnvelope {
            ciphertext: vec![0x5a; 48],
            nonce: vec![0x01; 24],
            key_id: "k1".to_owned(),
        }),
        submitted_at,
        technical: None,
        financial: None,
        final_score: None,
        ranking: None,
        evaluation_completed_at: None,
        is_deleted: false,
    }
}

pub async fn supplier(db: &Db, name: &str) -> anyhow::Result<SupplierId> {
    let supplier_id = SupplierId::new_v4();
    db.register_supplier(&Participant {
        supplier_id,
        display_name: name.to_owned(),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
    })
    .await?;
    Ok(supplier_id)
}
