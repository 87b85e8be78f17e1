#![warn(missing_docs)]
//! Workflows of the sealed-bid tender lifecycle.
//!
//! Every operation is a free function generic over an
//! [`Application`](tender_core::ports::Application), which supplies the store,
//! the sealing component, the audit sink, the notifier, the clock and the
//! authorization decisions. Operations return [`EngineResult`]: whole-operation
//! failures are typed [`Failure`]s, while per-item problems (an offer whose
//! envelope does not authenticate, a supplier that cannot be notified) are
//! reported on the item or in the outcome and never abort the operation.
//!
//! Audit entries are best-effort: a failing audit sink is logged and ignored.

use tender_core::{
    models::{Tender, TenderId, UserId},
    ports::{Application, Repository, TenderRepository as _},
};

mod audit;
mod error;

pub mod autoclose;
pub mod cancellation;
pub mod evaluation;
pub mod lifecycle;
pub mod opening;
pub mod report;
pub mod submission;

pub use error::Failure;

/// The error type of the store behind an application
pub type StoreError<A> = <<A as Application>::Repository as Repository>::Error;

/// The result of a workflow operation
pub type EngineResult<T, A> = Result<T, Failure<StoreError<A>>>;

/// Load a live tender the actor may manage.
///
/// Absence, soft deletion and lack of ownership all collapse into
/// `NotFoundOrForbidden`, so callers cannot discover tenders they do not own.
pub(crate) async fn managed_tender<A: Application>(
    app: &A,
    tender_id: TenderId,
    actor: UserId,
) -> EngineResult<Tender, A> {
    match app.database().get_tender(tender_id).await? {
        Some(tender) if !tender.is_deleted => {
            if app.can_manage_tender(actor, &tender).await {
                Ok(tender)
            } else {
                Err(Failure::NotFoundOrForbidden)
            }
        }
        _ => Err(Failure::NotFoundOrForbidden),
    }
}

/// Load a live tender, without any authorization.
pub(crate) async fn live_tender<A: Application>(
    app: &A,
    tender_id: TenderId,
) -> EngineResult<Tender, A> {
    match app.database().get_tender(tender_id).await? {
        Some(tender) if !tender.is_deleted => Ok(tender),
        _ => Err(Failure::NotFound),
    }
}
