use super::{AuditSink, MarketRepository, Notifier, Sealer};
use crate::models::{Tender, UserId};
use std::time::Duration;
use time::OffsetDateTime;

/// The integration point for a concrete deployment.
///
/// An application bundles the store, the sealing component, the audit sink
/// and the notification channel, and makes the authorization decisions. The
/// workflows in `tender-engine` are generic over this trait, which is what
/// lets tests substitute a fixed clock or a failing notifier.
pub trait Application: Send + Sync {
    /// The relational store
    type Repository: MarketRepository;

    /// The sealing component
    type Sealer: Sealer;

    /// Where audit entries go
    type Audit: AuditSink;

    /// The outbound notification channel
    type Notifier: Notifier;

    /// Get the store
    fn database(&self) -> &Self::Repository;

    /// Get the sealing component
    fn sealer(&self) -> &Self::Sealer;

    /// Get the audit sink
    fn audit(&self) -> &Self::Audit;

    /// Get the notification channel
    fn notifier(&self) -> &Self::Notifier;

    /// The current time
    fn now(&self) -> OffsetDateTime;

    /// Upper bound on a single notification delivery
    fn notification_timeout(&self) -> Duration;

    /// Whether `actor` may manage `tender` (publish, close, cancel, open, rank).
    fn can_manage_tender(
        &self,
        actor: UserId,
        tender: &Tender,
    ) -> impl Future<Output = bool> + Send;

    /// Whether `actor` may record scores on the offers of `tender`.
    fn can_evaluate(&self, actor: UserId, tender: &Tender) -> impl Future<Output = bool> + Send;
}
