use super::{OfferId, ScoreRecord, SupplierId, TenderId, UnknownStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use time::OffsetDateTime;

/// The status of an offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferStatus {
    /// Submitted by the supplier and still sealed
    Submitted,
    /// Acknowledged by the buyer; treated the same as `submitted`
    Received,
    /// Scored by an evaluator
    Evaluated,
    /// Awarded
    Accepted,
    /// Not awarded
    Rejected,
    /// Voided because its tender was cancelled
    Cancelled,
}

impl OfferStatus {
    /// The stored representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Received => "received",
            Self::Evaluated => "evaluated",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the offer is still awaiting opening and evaluation
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Submitted | Self::Received)
    }
}

impl fmt::Display for OfferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "received" => Ok(Self::Received),
            "evaluated" => Ok(Self::Evaluated),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Authenticated ciphertext of an offer's financial payload.
///
/// The key itself is never part of the envelope, only the opaque identifier
/// the key resolver uses to find it.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedEnvelope {
    /// Ciphertext including the authentication tag
    pub ciphertext: Vec<u8>,
    /// The nonce used for this envelope
    pub nonce: Vec<u8>,
    /// Identifier of the sealing key
    pub key_id: String,
}

// Ciphertext is not something that belongs in a log line, even redacted to hex.
impl fmt::Debug for SealedEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedEnvelope")
            .field("ciphertext_len", &self.ciphertext.len())
            .field("nonce_len", &self.nonce.len())
            .field("key_id", &self.key_id)
            .finish()
    }
}

/// The competitive part of an offer, only ever held in plaintext in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialPayload {
    /// The total offered price
    pub total_amount: Decimal,
    /// Free-form financial proposal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_proposal: Option<String>,
    /// Proposed payment terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

/// An offer as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    /// The offer's identifier
    pub id: OfferId,
    /// The tender this offer answers
    pub tender_id: TenderId,
    /// The submitting supplier
    pub supplier_id: SupplierId,
    /// Display name of the supplier at the time of reading
    pub supplier_name: String,
    /// Plaintext offer number, e.g. `OFR-TND-1-0003`
    pub offer_number: String,
    /// Current status
    pub status: OfferStatus,
    /// The sealed financial payload
    #[serde(skip)]
    pub envelope: Option<SealedEnvelope>,
    /// Submission time; the tie-break order for everything downstream
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    /// Technical evaluation, once recorded
    pub technical: Option<ScoreRecord>,
    /// Financial evaluation, once recorded
    pub financial: Option<ScoreRecord>,
    /// Advisory final score
    pub final_score: Option<f64>,
    /// Advisory rank, 1 being best
    pub ranking: Option<u32>,
    /// When the final score was computed
    #[serde(with = "time::serde::rfc3339::option")]
    pub evaluation_completed_at: Option<OffsetDateTime>,
    /// Soft-delete flag
    pub is_deleted: bool,
}

/// An offer returned from an opening.
///
/// When unsealing succeeded the financial fields are merged in and
/// `was_encrypted` is set. When it failed, `decryption_failed` is set and the
/// financial fields are absent; the offer is still part of the result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenedOffer {
    /// The stored offer
    #[serde(flatten)]
    pub offer: Offer,
    /// The recovered financial payload
    #[serde(flatten)]
    pub financial: Option<FinancialPayload>,
    /// The offer carried a sealed envelope that was successfully opened
    pub was_encrypted: bool,
    /// The offer's envelope failed to authenticate
    pub decryption_failed: bool,
}

impl OpenedOffer {
    /// Wrap an offer whose envelope has not been (and will not be) opened
    pub fn sealed(offer: Offer) -> Self {
        Self {
            offer,
            financial: None,
            was_encrypted: false,
            decryption_failed: false,
        }
    }

    /// Wrap an offer whose envelope was opened successfully
    pub fn unsealed(offer: Offer, financial: FinancialPayload) -> Self {
        Self {
            offer,
            financial: Some(financial),
            was_encrypted: true,
            decryption_failed: false,
        }
    }

    /// Wrap an offer whose envelope failed to open
    pub fn failed(offer: Offer) -> Self {
        Self {
            offer,
            financial: None,
            was_encrypted: false,
            decryption_failed: true,
        }
    }
}
