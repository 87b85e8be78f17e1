mod application;
mod audit;
mod directory;
mod evaluation;
mod notify;
mod offer;
mod report;
mod seal;
mod tender;

pub use application::Application;
pub use audit::AuditSink;
pub use directory::ParticipantDirectory;
pub use evaluation::EvaluationRepository;
pub use notify::Notifier;
pub use offer::OfferRepository;
pub use report::ReportRepository;
pub use seal::Sealer;
pub use tender::TenderRepository;

/// Base trait for the relational store.
///
/// The store adapter decides its own error type; the workflows only need to
/// carry it to the caller, distinct from the domain failures.
pub trait Repository: Send + Sync {
    /// Error type for infrastructure failures (connection lost, decode error, ...)
    type Error: std::error::Error + Send + Sync + 'static;
}

/// Convenience marker for a store implementing every repository the
/// workflows touch. A blanket implementation covers any qualifying type.
pub trait MarketRepository:
    TenderRepository + OfferRepository + ReportRepository + EvaluationRepository + ParticipantDirectory
{
}

impl<T> MarketRepository for T where
    T: TenderRepository
        + OfferRepository
        + ReportRepository
        + EvaluationRepository
        + ParticipantDirectory
{
}
