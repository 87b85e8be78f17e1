//! Cancelling a tender outside the deadline path.
//!
//! The status change and the cascade to the tender's offers commit together,
//! before anyone is notified. Notifications are best-effort: each delivery is
//! bounded by the application's timeout, and a failed or timed-out delivery
//! is logged and counted without affecting the cancellation. Every affected
//! supplier ends up counted as either notified or failed.

use crate::{EngineResult, Failure, audit, lifecycle::lost_race, live_tender, managed_tender};
use serde::Serialize;
use tender_core::{
    models::{
        AuditEntry, CancellationStatus, EntityType, Notification, Participant, SupplierId,
        Tender, TenderId, TenderStatus, Transition, UserId,
    },
    ports::{Application, Notifier as _, ParticipantDirectory as _, TenderRepository as _},
};

/// What a cancellation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CancellationOutcome {
    /// The tender's cancellation state after the call
    #[serde(flatten)]
    pub status: CancellationStatus,
    /// Suppliers whose offers were cancelled
    pub affected_suppliers: u32,
    /// Notifications delivered
    pub notified: u32,
    /// Affected suppliers who were not notified: no address on file, missing
    /// from the directory, or the delivery failed or timed out
    pub notification_failures: u32,
}

/// Cancel a tender the buyer owns, cascading to its offers.
pub async fn cancel<A: Application>(
    app: &A,
    tender_id: TenderId,
    buyer_id: UserId,
    reason: &str,
) -> EngineResult<CancellationOutcome, A> {
    let tender = managed_tender(app, tender_id, buyer_id).await?;
    if let Err(error) = tender.status.apply(Transition::Cancel) {
        return Err(Failure::invalid_transition(error));
    }

    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Failure::Validation(
            "a cancellation reason is required".into(),
        ));
    }

    let now = app.now();
    let Some(suppliers) = app.database().cancel_tender(tender.id, reason, now).await? else {
        return Err(lost_race(app, &tender, Transition::Cancel).await);
    };

    let (notified, notification_failures) = notify_participants(app, &tender, reason, &suppliers).await;

    audit::record(
        app,
        AuditEntry::new(
            Some(buyer_id),
            EntityType::Tender,
            tender.id,
            Transition::Cancel.action(),
            format!(
                "{} -> {}: {reason} ({notified} notified, {notification_failures} failed)",
                tender.status,
                TenderStatus::Cancelled
            ),
        ),
    )
    .await;

    Ok(CancellationOutcome {
        status: CancellationStatus {
            tender_id: tender.id,
            status: TenderStatus::Cancelled,
            cancellation_reason: Some(reason.to_owned()),
            cancelled_at: Some(now),
        },
        affected_suppliers: suppliers.len() as u32,
        notified,
        notification_failures,
    })
}

/// The cancellation state of a tender.
pub async fn cancellation_status<A: Application>(
    app: &A,
    tender_id: TenderId,
) -> EngineResult<CancellationStatus, A> {
    let tender = live_tender(app, tender_id).await?;
    Ok(CancellationStatus::from(&tender))
}

/// Notify every reachable participant, returning (delivered, failed).
async fn notify_participants<A: Application>(
    app: &A,
    tender: &Tender,
    reason: &str,
    suppliers: &[SupplierId],
) -> (u32, u32) {
    // The cancellation is committed; a directory outage only costs the notices
    let participants = match app.database().participants(suppliers).await {
        Ok(participants) => participants,
        Err(error) => {
            tracing::warn!(tender_id = %tender.id, %error, "failed to look up participants");
            return (0, suppliers.len() as u32);
        }
    };

    let mut failed = 0;
    for supplier_id in suppliers {
        if !participants.iter().any(|p| p.supplier_id == *supplier_id) {
            failed += 1;
            tracing::warn!(
                tender_id = %tender.id,
                %supplier_id,
                "participant missing from the directory, not notified"
            );
        }
    }

    let timeout = app.notification_timeout();
    let mut notified = 0;

    for participant in participants {
        let Some(notification) = notice(tender, reason, &participant) else {
            failed += 1;
            tracing::warn!(
                tender_id = %tender.id,
                supplier_id = %participant.supplier_id,
                "participant has no email address, not notified"
            );
            continue;
        };
        match tokio::time::timeout(timeout, app.notifier().send(&notification)).await {
            Ok(Ok(())) => notified += 1,
            Ok(Err(error)) => {
                failed += 1;
                tracing::warn!(
                    tender_id = %tender.id,
                    supplier_id = %participant.supplier_id,
                    %error,
                    "failed to notify participant of cancellation"
                );
            }
            Err(_) => {
                failed += 1;
                tracing::warn!(
                    tender_id = %tender.id,
                    supplier_id = %participant.supplier_id,
                    timeout_ms = timeout.as_millis() as u64,
                    "notification timed out"
                );
            }
        }
    }

    (notified, failed)
}

fn notice(tender: &Tender, reason: &str, participant: &Participant) -> Option<Notification> {
    let address = participant.email.as_deref()?.trim();
    if address.is_empty() {
        return None;
    }
    Some(Notification {
        address: address.to_owned(),
        subject: format!("Tender {} has been cancelled", tender.reference),
        body: format!(
            "Dear {},\n\nthe tender \"{}\" ({}) has been cancelled. Your offer has been withdrawn.\n\nReason: {reason}\n",
            participant.display_name, tender.title, tender.reference
        ),
    })
}
