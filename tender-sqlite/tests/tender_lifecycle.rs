mod common;

use common::{NOW, db, offer, supplier, tender};
use rstest::*;
use tender_core::{
    models::{OfferStatus, TenderStatus, Transition},
    ports::{OfferRepository, TenderRepository},
};
use tender_sqlite::Db;
use time::{Duration, OffsetDateTime};

#[test_log::test(tokio::test)]
async fn tender_round_trips() -> anyhow::Result<()> {
    let db = db().await?;
    let created = tender("TND-2026-001", TenderStatus::Draft, NOW + Duration::days(3));
    db.create_tender(&created).await?;

    let stored = db.get_tender(created.id).await?.expect("tender exists");
    assert_eq!(stored, created);
    Ok(())
}

#[rstest]
#[case::publish_draft(TenderStatus::Draft, Transition::Publish, true)]
#[case::publish_published(TenderStatus::Published, Transition::Publish, false)]
#[case::close_published(TenderStatus::Published, Transition::Close, true)]
#[case::close_draft(TenderStatus::Draft, Transition::Close, false)]
#[case::cancel_in_progress(TenderStatus::InProgress, Transition::Cancel, true)]
#[case::cancel_closed(TenderStatus::Closed, Transition::Cancel, false)]
#[case::cancel_cancelled(TenderStatus::Cancelled, Transition::Cancel, false)]
#[test_log::test(tokio::test)]
async fn transitions_are_guarded_on_prior_status(
    #[case] from: TenderStatus,
    #[case] transition: Transition,
    #[case] applies: bool,
) -> anyhow::Result<()> {
    let db = db().await?;
    let created = tender("TND-2026-002", from, NOW + Duration::days(3));
    db.create_tender(&created).await?;

    assert_eq!(db.transition_tender(created.id, transition, NOW).await?, applies);

    let stored = db.get_tender(created.id).await?.expect("tender exists");
    if applies {
        assert_eq!(stored.status, transition.target());
        assert_eq!(stored.updated_at, NOW);
        let stamp = match transition {
            Transition::Publish => stored.published_at,
            Transition::Close => stored.closed_at,
            Transition::Cancel => stored.cancelled_at,
        };
        assert_eq!(stamp, Some(NOW));
    } else {
        assert_eq!(stored, created);
    }
    Ok(())
}

#[test_log::test(tokio::test)]
async fn second_close_loses_the_race() -> anyhow::Result<()> {
    let db = db().await?;
    let created = tender("TND-2026-003", TenderStatus::Published, NOW - Duration::minutes(1));
    db.create_tender(&created).await?;

    let (first, second) = tokio::join!(
        db.transition_tender(created.id, Transition::Close, NOW),
        db.transition_tender(created.id, Transition::Close, NOW + Duration::seconds(1)),
    );
    assert_ne!(first?, second?);

    let stored = db.get_tender(created.id).await?.expect("tender exists");
    assert_eq!(stored.status, TenderStatus::Closed);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn deleted_tenders_do_not_transition() -> anyhow::Result<()> {
    let db = db().await?;
    let mut created = tender("TND-2026-004", TenderStatus::Draft, NOW + Duration::days(3));
    created.is_deleted = true;
    db.create_tender(&created).await?;

    assert!(!db.transition_tender(created.id, Transition::Publish, NOW).await?);
    assert!(db.cancel_tender(created.id, "withdrawn", NOW).await?.is_none());
    Ok(())
}

#[test_log::test(tokio::test)]
async fn cancel_cascades_to_offers() -> anyhow::Result<()> {
    let db = db().await?;
    let created = tender("TND-2026-005", TenderStatus::Published, NOW + Duration::days(3));
    db.create_tender(&created).await?;

    let acme = supplier(&db, "Acme Furniture").await?;
    let birch = supplier(&db, "Birch & Co").await?;
    let offers = [
        offer(&created, acme, "OFR-TND-2026-005-0001", NOW - Duration::hours(3)),
        offer(&created, birch, "OFR-TND-2026-005-0002", NOW - Duration::hours(2)),
        offer(&created, acme, "OFR-TND-2026-005-0003", NOW - Duration::hours(1)),
    ];
    for offer in &offers {
        assert!(db.create_offer(offer).await?);
    }

    let notified = db
        .cancel_tender(created.id, "Budget withdrawn", NOW)
        .await?
        .expect("draft or published tenders can be cancelled");
    let mut expected = vec![acme, birch];
    expected.sort_unstable();
    assert_eq!(notified, expected);

    let stored = db.get_tender(created.id).await?.expect("tender exists");
    assert_eq!(stored.status, TenderStatus::Cancelled);
    assert_eq!(stored.cancellation_reason.as_deref(), Some("Budget withdrawn"));
    assert_eq!(stored.cancelled_at, Some(NOW));

    for offer in &offers {
        let stored = db.get_offer(offer.id).await?.expect("offer exists");
        assert_eq!(stored.status, OfferStatus::Cancelled);
        assert!(stored.is_deleted);
    }
    assert!(db.pending_offers(created.id).await?.is_empty());

    // Terminal: a second cancellation writes nothing
    assert!(db.cancel_tender(created.id, "again", NOW).await?.is_none());
    let stored = db.get_tender(created.id).await?.expect("tender exists");
    assert_eq!(stored.cancellation_reason.as_deref(), Some("Budget withdrawn"));
    Ok(())
}

#[test_log::test(tokio::test)]
async fn due_tenders_are_published_past_deadline_and_not_deleted() -> anyhow::Result<()> {
    let db = db().await?;

    let oldest = tender("TND-A", TenderStatus::Published, NOW - Duration::hours(5));
    let older = tender("TND-B", TenderStatus::Published, NOW - Duration::hours(1));
    let upcoming = tender("TND-C", TenderStatus::Published, NOW + Duration::hours(1));
    let draft = tender("TND-D", TenderStatus::Draft, NOW - Duration::hours(2));
    let closed = tender("TND-E", TenderStatus::Closed, NOW - Duration::hours(2));
    let mut deleted = tender("TND-F", TenderStatus::Published, NOW - Duration::hours(2));
    deleted.is_deleted = true;

    for tender in [&older, &upcoming, &draft, &closed, &deleted, &oldest] {
        db.create_tender(tender).await?;
    }

    let due: Vec<_> = db
        .due_tenders(NOW, 100)
        .await?
        .into_iter()
        .map(|t| t.reference)
        .collect();
    assert_eq!(due, ["TND-A", "TND-B"]);

    let limited = db.due_tenders(NOW, 1).await?;
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].id, oldest.id);
    Ok(())
}

async fn due_at(db: &Db, now: OffsetDateTime) -> anyhow::Result<Vec<String>> {
    Ok(db
        .due_tenders(now, 100)
        .await?
        .into_iter()
        .map(|t| t.reference)
        .collect())
}

#[test_log::test(tokio::test)]
async fn deadlines_compare_across_subsecond_precision() -> anyhow::Result<()> {
    let db = db().await?;

    // Stored as `...00.5`, `...00.25` and `...00.0`: different fraction lengths
    let half = tender("TND-HALF", TenderStatus::Published, NOW + Duration::milliseconds(500));
    let quarter = tender("TND-QUARTER", TenderStatus::Published, NOW + Duration::milliseconds(250));
    let whole = tender("TND-WHOLE", TenderStatus::Published, NOW);
    let later = tender("TND-LATER", TenderStatus::Published, NOW + Duration::seconds(1));
    for tender in [&half, &quarter, &whole, &later] {
        db.create_tender(tender).await?;
    }

    assert!(due_at(&db, NOW).await?.is_empty());
    assert_eq!(due_at(&db, NOW + Duration::milliseconds(300)).await?, ["TND-WHOLE", "TND-QUARTER"]);
    assert_eq!(
        due_at(&db, NOW + Duration::milliseconds(600)).await?,
        ["TND-WHOLE", "TND-QUARTER", "TND-HALF"]
    );
    assert_eq!(
        due_at(&db, NOW + Duration::milliseconds(1_050)).await?,
        ["TND-WHOLE", "TND-QUARTER", "TND-HALF", "TND-LATER"]
    );
    Ok(())
}
