//! Creating tenders and moving them through their states.
//!
//! Every status change is checked against the state machine first, for a
//! precise error, and then persisted as a conditional update. When the update
//! finds the tender already moved on, the fresh status is reported instead.

use crate::{EngineResult, Failure, audit, managed_tender, report};
use serde::Deserialize;
use tender_core::{
    models::{
        AuditEntry, EntityType, OpenedOffer, ReportKind, Tender, TenderId, TenderStatus,
        Transition, UserId,
    },
    ports::{Application, OfferRepository as _, TenderRepository as _},
};
use time::OffsetDateTime;

/// The buyer-supplied part of a new tender.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTender {
    /// Public reference number, unique across tenders
    pub reference: String,
    /// Title
    pub title: String,
    /// Last instant at which offers are accepted
    #[serde(with = "time::serde::rfc3339")]
    pub deadline: OffsetDateTime,
    /// Instant from which offers may be opened; not before the deadline
    #[serde(with = "time::serde::rfc3339")]
    pub opening_date: OffsetDateTime,
}

/// Create a tender in `draft`.
pub async fn create_tender<A: Application>(
    app: &A,
    buyer_id: UserId,
    new: NewTender,
) -> EngineResult<Tender, A> {
    let reference = new.reference.trim();
    let title = new.title.trim();
    if reference.is_empty() {
        return Err(Failure::Validation("reference must not be empty".into()));
    }
    if title.is_empty() {
        return Err(Failure::Validation("title must not be empty".into()));
    }
    if new.opening_date < new.deadline {
        return Err(Failure::Validation(
            "opening date must not be before the deadline".into(),
        ));
    }

    let now = app.now();
    let tender = Tender {
        id: TenderId::new_v4(),
        reference: reference.to_owned(),
        title: title.to_owned(),
        buyer_id,
        status: TenderStatus::Draft,
        deadline: new.deadline,
        opening_date: new.opening_date,
        published_at: None,
        closed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        is_deleted: false,
        created_at: now,
        updated_at: now,
    };
    app.database().create_tender(&tender).await?;

    audit::record(
        app,
        AuditEntry::new(
            Some(buyer_id),
            EntityType::Tender,
            tender.id,
            "create",
            format!("created draft {}", tender.reference),
        ),
    )
    .await;

    Ok(tender)
}

/// Publish a draft, opening it for submissions.
pub async fn publish<A: Application>(
    app: &A,
    tender_id: TenderId,
    actor: UserId,
) -> EngineResult<Tender, A> {
    let tender = managed_tender(app, tender_id, actor).await?;
    transition(app, tender, Transition::Publish, Some(actor)).await
}

/// Close a published tender ahead of the scheduler.
///
/// The closing inventory is written first, exactly as the auto-close run
/// does, so a manually closed tender looks the same as one closed at its
/// deadline.
pub async fn close<A: Application>(
    app: &A,
    tender_id: TenderId,
    actor: UserId,
) -> EngineResult<Tender, A> {
    let tender = managed_tender(app, tender_id, actor).await?;
    if let Err(error) = tender.status.apply(Transition::Close) {
        return Err(Failure::invalid_transition(error));
    }

    let now = app.now();
    if close_with_inventory(app, &tender, Some(actor), now).await? {
        Ok(Tender {
            status: TenderStatus::Closed,
            closed_at: Some(now),
            updated_at: now,
            ..tender
        })
    } else {
        Err(lost_race(app, &tender, Transition::Close).await)
    }
}

/// Write the closing inventory of a tender, then close it.
///
/// Returns whether this call performed the close; `false` means the tender
/// was no longer `published` (another run got there first). The inventory is
/// idempotent per tender, so a retry after a failed close reuses it.
pub(crate) async fn close_with_inventory<A: Application>(
    app: &A,
    tender: &Tender,
    actor: Option<UserId>,
    now: OffsetDateTime,
) -> EngineResult<bool, A> {
    let db = app.database();

    let offers: Vec<OpenedOffer> = db
        .pending_offers(tender.id)
        .await?
        .into_iter()
        .map(OpenedOffer::sealed)
        .collect();
    report::generate(app, tender.id, actor, ReportKind::Closing, &offers).await?;

    let closed = db
        .transition_tender(tender.id, Transition::Close, now)
        .await?;
    if closed {
        audit::record(
            app,
            AuditEntry::new(
                actor,
                EntityType::Tender,
                tender.id,
                Transition::Close.action(),
                format!(
                    "{} -> {} with {} offers",
                    TenderStatus::Published,
                    TenderStatus::Closed,
                    offers.len()
                ),
            ),
        )
        .await;
    }

    Ok(closed)
}

/// Check `transition` against the state machine, persist it conditionally,
/// and audit it.
pub(crate) async fn transition<A: Application>(
    app: &A,
    tender: Tender,
    transition: Transition,
    actor: Option<UserId>,
) -> EngineResult<Tender, A> {
    let target = match tender.status.apply(transition) {
        Ok(target) => target,
        Err(error) => return Err(Failure::invalid_transition(error)),
    };

    let now = app.now();
    if !app
        .database()
        .transition_tender(tender.id, transition, now)
        .await?
    {
        return Err(lost_race(app, &tender, transition).await);
    }

    audit::record(
        app,
        AuditEntry::new(
            actor,
            EntityType::Tender,
            tender.id,
            transition.action(),
            format!("{} -> {}", tender.status, target),
        ),
    )
    .await;

    let mut tender = tender;
    match transition {
        Transition::Publish => tender.published_at = Some(now),
        Transition::Close => tender.closed_at = Some(now),
        Transition::Cancel => tender.cancelled_at = Some(now),
    }
    tender.status = target;
    tender.updated_at = now;
    Ok(tender)
}

/// The failure to report when a conditional update found the tender moved on.
pub(crate) async fn lost_race<A: Application>(
    app: &A,
    tender: &Tender,
    transition: Transition,
) -> Failure<crate::StoreError<A>> {
    match app.database().get_tender(tender.id).await {
        Ok(Some(current)) if !current.is_deleted => Failure::InvalidState {
            status: current.status,
            action: transition.action(),
        },
        Ok(_) => Failure::NotFoundOrForbidden,
        Err(error) => Failure::Store(error),
    }
}
