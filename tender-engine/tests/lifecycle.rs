mod common;

use common::{T0, TestApp, payload};
use rstest::*;
use std::sync::atomic::Ordering;
use tender_core::{
    models::{OfferStatus, ReportKind, SupplierId, TenderStatus, UserId},
    ports::{OfferRepository, TenderRepository},
};
use tender_engine::{
    Failure, cancellation,
    lifecycle::{self, NewTender},
    report, submission,
};
use time::Duration;

fn new_tender(reference: &str, title: &str, deadline: Duration, opening: Duration) -> NewTender {
    NewTender {
        reference: reference.to_owned(),
        title: title.to_owned(),
        deadline: T0 + deadline,
        opening_date: T0 + opening,
    }
}

#[rstest]
#[case::empty_reference(new_tender("  ", "Bridge repairs", Duration::days(1), Duration::days(2)))]
#[case::empty_title(new_tender("TND-1", "", Duration::days(1), Duration::days(2)))]
#[case::opens_before_deadline(new_tender("TND-1", "Bridge repairs", Duration::days(2), Duration::days(1)))]
#[test_log::test(tokio::test)]
async fn invalid_tenders_are_rejected(#[case] new: NewTender) -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let failure = lifecycle::create_tender(&app, UserId::new_v4(), new)
        .await
        .unwrap_err();
    assert_eq!(failure.code(), "VALIDATION_ERROR");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn opening_may_coincide_with_the_deadline() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = lifecycle::create_tender(
        &app,
        UserId::new_v4(),
        new_tender(" TND-7 ", " Bridge repairs ", Duration::days(1), Duration::days(1)),
    )
    .await?;
    assert_eq!(tender.status, TenderStatus::Draft);
    assert_eq!(tender.reference, "TND-7");
    assert_eq!(tender.title, "Bridge repairs");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn publish_is_draft_only() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let buyer = UserId::new_v4();
    let draft = lifecycle::create_tender(
        &app,
        buyer,
        new_tender("TND-2", "School catering", Duration::days(1), Duration::days(2)),
    )
    .await?;

    let published = lifecycle::publish(&app, draft.id, buyer).await?;
    assert_eq!(published.status, TenderStatus::Published);
    assert_eq!(published.published_at, Some(T0));
    assert_eq!(app.db.get_tender(draft.id).await?, Some(published));

    let again = lifecycle::publish(&app, draft.id, buyer).await.unwrap_err();
    assert!(matches!(
        again,
        Failure::InvalidState {
            status: TenderStatus::Published,
            action: "publish"
        }
    ));

    assert_eq!(app.audit.actions(), ["create", "publish"]);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn strangers_cannot_tell_a_tender_exists() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-3", Duration::days(1), Duration::days(2))
        .await?;
    let stranger = UserId::new_v4();

    let foreign = lifecycle::publish(&app, tender.id, stranger).await.unwrap_err();
    let missing = lifecycle::publish(&app, tender_core::models::TenderId::new_v4(), stranger)
        .await
        .unwrap_err();
    assert_eq!(foreign.code(), "NOT_FOUND_OR_FORBIDDEN");
    assert_eq!(foreign.to_string(), missing.to_string());

    let cancel = cancellation::cancel(&app, tender.id, stranger, "not mine").await.unwrap_err();
    assert_eq!(cancel.code(), "NOT_FOUND_OR_FORBIDDEN");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn manual_close_writes_the_closing_inventory() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-4", Duration::days(1), Duration::days(2))
        .await?;
    let supplier = app.supplier("Acme", None).await?;
    submission::submit_offer(&app, tender.id, supplier, payload("250")).await?;

    app.advance(Duration::hours(1));
    let closed = lifecycle::close(&app, tender.id, tender.buyer_id).await?;
    assert_eq!(closed.status, TenderStatus::Closed);
    assert_eq!(closed.closed_at, Some(T0 + Duration::hours(1)));

    let inventory =
        report::opening_report(&app, tender.id, tender.buyer_id, ReportKind::Closing).await?;
    assert_eq!(inventory.opened_by, Some(tender.buyer_id));
    assert_eq!(inventory.totals.total_offers_received, 1);
    assert_eq!(inventory.offers_summary[0].amount, None);

    let again = lifecycle::close(&app, tender.id, tender.buyer_id).await.unwrap_err();
    assert_eq!(again.to_string(), "cannot close a tender that is closed");
    Ok(())
}

#[rstest]
#[case::closed(TenderStatus::Closed)]
#[case::cancelled(TenderStatus::Cancelled)]
#[test_log::test(tokio::test)]
async fn terminal_tenders_cannot_be_cancelled(#[case] terminal: TenderStatus) -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-5", Duration::days(1), Duration::days(2))
        .await?;
    match terminal {
        TenderStatus::Closed => {
            lifecycle::close(&app, tender.id, tender.buyer_id).await?;
        }
        _ => {
            cancellation::cancel(&app, tender.id, tender.buyer_id, "first").await?;
        }
    }

    let failure = cancellation::cancel(&app, tender.id, tender.buyer_id, "second")
        .await
        .unwrap_err();
    assert!(matches!(failure, Failure::InvalidState { status, .. } if status == terminal));
    assert_eq!(failure.code(), "INVALID_STATE");

    let stored = app.db.get_tender(tender.id).await?.expect("tender exists");
    assert_eq!(stored.status, terminal);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn cancellation_needs_a_reason() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-6", Duration::days(1), Duration::days(2))
        .await?;

    let failure = cancellation::cancel(&app, tender.id, tender.buyer_id, "   ")
        .await
        .unwrap_err();
    assert_eq!(failure.code(), "VALIDATION_ERROR");

    let status = cancellation::cancellation_status(&app, tender.id).await?;
    assert_eq!(status.status, TenderStatus::Published);
    assert_eq!(status.cancellation_reason, None);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn drafts_can_be_cancelled() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let buyer = UserId::new_v4();
    let draft = lifecycle::create_tender(
        &app,
        buyer,
        new_tender("TND-8", "Fleet leasing", Duration::days(1), Duration::days(2)),
    )
    .await?;

    let outcome = cancellation::cancel(&app, draft.id, buyer, "Requirements changed").await?;
    assert_eq!(outcome.affected_suppliers, 0);
    assert_eq!(outcome.notified, 0);
    assert_eq!(
        outcome.status.cancellation_reason.as_deref(),
        Some("Requirements changed")
    );
    Ok(())
}

#[test_log::test(tokio::test)]
async fn slow_notifications_time_out_without_blocking_the_cancellation() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-9", Duration::days(1), Duration::days(2))
        .await?;
    let slow = app.supplier("Slow Co", Some("bids@slow.example")).await?;
    let silent = app.supplier("Silent Co", None).await?;
    let offer = submission::submit_offer(&app, tender.id, slow, payload("10")).await?;
    submission::submit_offer(&app, tender.id, silent, payload("11")).await?;

    let outcome = cancellation::cancel(&app, tender.id, tender.buyer_id, "Scope changed").await?;
    assert_eq!(outcome.affected_suppliers, 2);
    assert_eq!(outcome.notified, 0);
    // One timed out, the other has no address on file
    assert_eq!(outcome.notification_failures, 2);

    let stored = app.db.get_offer(offer.id).await?.expect("offer exists");
    assert_eq!(stored.status, OfferStatus::Cancelled);
    Ok(())
}

#[test_log::test(tokio::test)]
async fn every_affected_supplier_is_counted_as_notified_or_failed() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let tender = app
        .published_tender("TND-11", Duration::days(1), Duration::days(2))
        .await?;
    let reachable = app.supplier("Reachable Co", Some("bids@reachable.example")).await?;
    let blank = app.supplier("Blank Co", Some("   ")).await?;
    let no_email = app.supplier("Paper Co", None).await?;
    let unlisted = SupplierId::new_v4();
    for (supplier, amount) in [(reachable, "10"), (blank, "11"), (no_email, "12"), (unlisted, "13")] {
        submission::submit_offer(&app, tender.id, supplier, payload(amount)).await?;
    }

    let outcome = cancellation::cancel(&app, tender.id, tender.buyer_id, "Scope changed").await?;
    assert_eq!(outcome.affected_suppliers, 4);
    assert_eq!(outcome.notified, 1);
    assert_eq!(outcome.notification_failures, 3);
    assert_eq!(
        outcome.notified + outcome.notification_failures,
        outcome.affected_suppliers
    );

    let sent = app.notifier.sent.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].address, "bids@reachable.example");
    Ok(())
}

#[test_log::test(tokio::test)]
async fn a_failing_audit_sink_never_blocks_a_transition() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let buyer = UserId::new_v4();
    let draft = lifecycle::create_tender(
        &app,
        buyer,
        new_tender("TND-10", "Cleaning services", Duration::days(1), Duration::days(2)),
    )
    .await?;

    app.audit.failing.store(true, Ordering::SeqCst);
    let published = lifecycle::publish(&app, draft.id, buyer).await?;
    assert_eq!(published.status, TenderStatus::Published);
    assert_eq!(app.audit.actions(), ["create"]);
    Ok(())
}
