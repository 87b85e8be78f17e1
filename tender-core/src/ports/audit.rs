use crate::models::AuditEntry;

/// The write-only audit log.
///
/// Recording is best-effort from the workflows' point of view: a failure is
/// logged and otherwise ignored, it never undoes the audited action.
pub trait AuditSink: Send + Sync {
    /// Error type for a failed write
    type Error: std::error::Error + Send + Sync + 'static;

    /// Append an entry.
    fn record(&self, entry: AuditEntry) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
