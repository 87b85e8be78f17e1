//! Type definitions for the SQLite implementation.
//!
//! The public [`DateTime`] is the storage form of every timestamp. The row
//! types mirror the tables one to one and are converted into the domain models
//! on the way out; a row that does not describe a valid model (an unknown
//! status, a negative count) surfaces as a decode error.

use sqlx::types::Json;
use tender_core::models::{
    OfferSummary, Offer, OfferId, OpeningReport, Participant, ReportId, ReportStatus,
    ReportTotals, ScoreRecord, SealedEnvelope, SupplierId, Tender, TenderId, UserId,
};

mod datetime;
pub use datetime::DateTime;

pub(crate) fn decode_error(error: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(error))
}

pub(crate) const TENDER_COLUMNS: &str = r#"
    id, reference, title, buyer_id, status, deadline, opening_date,
    published_at, closed_at, cancelled_at, cancellation_reason,
    is_deleted, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct TenderRow {
    pub id: TenderId,
    pub reference: String,
    pub title: String,
    pub buyer_id: UserId,
    pub status: String,
    pub deadline: DateTime,
    pub opening_date: DateTime,
    pub published_at: Option<DateTime>,
    pub closed_at: Option<DateTime>,
    pub cancelled_at: Option<DateTime>,
    pub cancellation_reason: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl TryFrom<TenderRow> for Tender {
    type Error = sqlx::Error;

    fn try_from(row: TenderRow) -> Result<Self, Self::Error> {
        Ok(Tender {
            id: row.id,
            reference: row.reference,
            title: row.title,
            buyer_id: row.buyer_id,
            status: row.status.parse().map_err(decode_error)?,
            deadline: row.deadline.into(),
            opening_date: row.opening_date.into(),
            published_at: row.published_at.map(Into::into),
            closed_at: row.closed_at.map(Into::into),
            cancelled_at: row.cancelled_at.map(Into::into),
            cancellation_reason: row.cancellation_reason,
            is_deleted: row.is_deleted,
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
        })
    }
}

// The supplier's display name is owned by the directory, so it is joined in
// rather than copied onto the offer.
pub(crate) const OFFER_SELECT: &str = r#"
    select
        offer.id, offer.tender_id, offer.supplier_id,
        coalesce(supplier.display_name, '') as supplier_name,
        offer.offer_number, offer.status,
        offer.ciphertext, offer.nonce, offer.key_id,
        offer.submitted_at,
        offer.technical_score, offer.technical_comments,
        offer.technical_evaluator_id, offer.technical_evaluated_at,
        offer.financial_score, offer.financial_comments,
        offer.financial_evaluator_id, offer.financial_evaluated_at,
        offer.final_score, offer.ranking, offer.evaluation_completed_at,
        offer.is_deleted
    from
        offer
    left join
        supplier on supplier.id = offer.supplier_id
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct OfferRow {
    pub id: OfferId,
    pub tender_id: TenderId,
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub offer_number: String,
    pub status: String,
    pub ciphertext: Option<Vec<u8>>,
    pub nonce: Option<Vec<u8>>,
    pub key_id: Option<String>,
    pub submitted_at: DateTime,
    pub technical_score: Option<f64>,
    pub technical_comments: Option<String>,
    pub technical_evaluator_id: Option<UserId>,
    pub technical_evaluated_at: Option<DateTime>,
    pub financial_score: Option<f64>,
    pub financial_comments: Option<String>,
    pub financial_evaluator_id: Option<UserId>,
    pub financial_evaluated_at: Option<DateTime>,
    pub final_score: Option<f64>,
    pub ranking: Option<i64>,
    pub evaluation_completed_at: Option<DateTime>,
    pub is_deleted: bool,
}

fn score_record(
    score: Option<f64>,
    comments: Option<String>,
    evaluator_id: Option<UserId>,
    evaluated_at: Option<DateTime>,
) -> Option<ScoreRecord> {
    Some(ScoreRecord {
        score: score?,
        comments,
        evaluator_id: evaluator_id?,
        evaluated_at: evaluated_at?.into(),
    })
}

impl TryFrom<OfferRow> for Offer {
    type Error = sqlx::Error;

    fn try_from(row: OfferRow) -> Result<Self, Self::Error> {
        let envelope = match (row.ciphertext, row.nonce, row.key_id) {
            (Some(ciphertext), Some(nonce), Some(key_id)) => Some(SealedEnvelope {
                ciphertext,
                nonce,
                key_id,
            }),
            _ => None,
        };

        Ok(Offer {
            id: row.id,
            tender_id: row.tender_id,
            supplier_id: row.supplier_id,
            supplier_name: row.supplier_name,
            offer_number: row.offer_number,
            status: row.status.parse().map_err(decode_error)?,
            envelope,
            submitted_at: row.submitted_at.into(),
            technical: score_record(
                row.technical_score,
                row.technical_comments,
                row.technical_evaluator_id,
                row.technical_evaluated_at,
            ),
            financial: score_record(
                row.financial_score,
                row.financial_comments,
                row.financial_evaluator_id,
                row.financial_evaluated_at,
            ),
            final_score: row.final_score,
            ranking: row
                .ranking
                .map(u32::try_from)
                .transpose()
                .map_err(decode_error)?,
            evaluation_completed_at: row.evaluation_completed_at.map(Into::into),
            is_deleted: row.is_deleted,
        })
    }
}

pub(crate) const REPORT_COLUMNS: &str = r#"
    id, tender_id, kind, opened_by,
    total_offers_received, total_valid_offers, total_invalid_offers,
    offers_summary, opened_at, status
"#;

#[derive(sqlx::FromRow)]
pub(crate) struct ReportRow {
    pub id: ReportId,
    pub tender_id: TenderId,
    pub kind: String,
    pub opened_by: Option<UserId>,
    pub total_offers_received: i64,
    pub total_valid_offers: i64,
    pub total_invalid_offers: i64,
    pub offers_summary: Json<Vec<OfferSummary>>,
    pub opened_at: DateTime,
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown report status `{0}`")]
pub(crate) struct UnknownReportStatus(String);

impl TryFrom<ReportRow> for OpeningReport {
    type Error = sqlx::Error;

    fn try_from(row: ReportRow) -> Result<Self, Self::Error> {
        let status = match row.status.as_str() {
            "open" => ReportStatus::Open,
            _ => return Err(decode_error(UnknownReportStatus(row.status))),
        };

        Ok(OpeningReport {
            id: row.id,
            tender_id: row.tender_id,
            kind: row.kind.parse().map_err(decode_error)?,
            opened_by: row.opened_by,
            totals: ReportTotals {
                total_offers_received: u32::try_from(row.total_offers_received)
                    .map_err(decode_error)?,
                total_valid_offers: u32::try_from(row.total_valid_offers).map_err(decode_error)?,
                total_invalid_offers: u32::try_from(row.total_invalid_offers)
                    .map_err(decode_error)?,
            },
            offers_summary: row.offers_summary.0,
            opened_at: row.opened_at.into(),
            status,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ParticipantRow {
    pub supplier_id: SupplierId,
    pub display_name: String,
    pub email: Option<String>,
}

impl From<ParticipantRow> for Participant {
    fn from(row: ParticipantRow) -> Self {
        Participant {
            supplier_id: row.supplier_id,
            display_name: row.display_name,
            email: row.email,
        }
    }
}
