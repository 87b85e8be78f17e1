//! Opening reports: one immutable summary per tender and closing event.

use crate::{EngineResult, Failure, audit, managed_tender};
use tender_core::{
    models::{
        AuditEntry, EntityType, OpenedOffer, OpeningReport, ReportId, ReportKind, TenderId, UserId,
    },
    ports::{Application, ReportRepository as _},
};

/// Summarize `offers` (in their given order) into the report of `kind`.
///
/// Offers are never re-opened here; what the caller passes is what gets
/// counted. If the tender already has a report of this kind, that report is
/// returned unchanged and nothing is counted twice.
pub async fn generate<A: Application>(
    app: &A,
    tender_id: TenderId,
    actor: Option<UserId>,
    kind: ReportKind,
    offers: &[OpenedOffer],
) -> EngineResult<OpeningReport, A> {
    let report = OpeningReport::generate(
        ReportId::new_v4(),
        tender_id,
        kind,
        actor,
        offers,
        app.now(),
    );

    let (report, created) = app.database().insert_report(&report).await?;
    if created {
        let totals = report.totals;
        audit::record(
            app,
            AuditEntry::new(
                actor,
                EntityType::OpeningReport,
                report.id,
                "generate_report",
                format!(
                    "{kind} report for tender {tender_id}: {} received, {} valid, {} invalid",
                    totals.total_offers_received,
                    totals.total_valid_offers,
                    totals.total_invalid_offers
                ),
            ),
        )
        .await;
    } else {
        tracing::debug!(%tender_id, %kind, report_id = %report.id, "report already on record");
    }

    Ok(report)
}

/// Read the report of `kind` for a tender the requester manages.
pub async fn opening_report<A: Application>(
    app: &A,
    tender_id: TenderId,
    requester: UserId,
    kind: ReportKind,
) -> EngineResult<OpeningReport, A> {
    let tender = managed_tender(app, tender_id, requester).await?;
    app.database()
        .get_report(tender.id, kind)
        .await?
        .ok_or(Failure::NotFound)
}
