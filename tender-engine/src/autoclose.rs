//! One run of the auto-close scheduler.
//!
//! A run closes every published tender whose deadline has passed, writing its
//! closing inventory first. Each tender is its own unit of work: a failure on
//! one is logged and recorded in the summary, and the run moves on. Because
//! the close is a conditional update, overlapping runs (a slow tick, a second
//! instance) at worst find a tender already closed and skip it.

use crate::{EngineResult, lifecycle::close_with_inventory};
use serde::Serialize;
use tender_core::{
    models::TenderId,
    ports::{Application, TenderRepository as _},
};
use tracing::Instrument as _;

/// The default number of tenders a run considers.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoCloseSummary {
    /// Tenders this run closed
    pub closed: Vec<TenderId>,
    /// Tenders that were already closed (or cancelled) by the time this run got to them
    pub skipped: Vec<TenderId>,
    /// Tenders that failed, with the error
    pub failed: Vec<(TenderId, String)>,
}

/// Close up to `batch_size` due tenders.
///
/// Only the initial query for due tenders can fail the run as a whole.
pub async fn run_once<A: Application>(app: &A, batch_size: u32) -> EngineResult<AutoCloseSummary, A> {
    let now = app.now();
    let due = app.database().due_tenders(now, batch_size).await?;

    let mut summary = AutoCloseSummary::default();
    for tender in due {
        let span = tracing::info_span!("auto_close", tender_id = %tender.id, reference = %tender.reference);
        match close_with_inventory(app, &tender, None, now).instrument(span).await {
            Ok(true) => summary.closed.push(tender.id),
            Ok(false) => summary.skipped.push(tender.id),
            Err(error) => {
                tracing::warn!(
                    tender_id = %tender.id,
                    error = %error,
                    source = ?std::error::Error::source(&error).map(ToString::to_string),
                    "failed to auto-close tender"
                );
                summary.failed.push((tender.id, error.to_string()));
            }
        }
    }

    tracing::info!(
        closed = summary.closed.len(),
        skipped = summary.skipped.len(),
        failed = summary.failed.len(),
        "auto-close run finished"
    );

    Ok(summary)
}
