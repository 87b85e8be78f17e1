use tender_core::{models::AuditEntry, ports::{Application, AuditSink as _}};

/// Hand an entry to the audit sink; a failure is logged, never propagated.
pub(crate) async fn record<A: Application>(app: &A, entry: AuditEntry) {
    let action = entry.action.clone();
    let entity_type = entry.entity_type;
    if let Err(error) = app.audit().record(entry).await {
        tracing::warn!(%action, %entity_type, %error, "failed to record audit entry");
    }
}
