use super::{OpenedOffer, ReportId, TenderId, UnknownStatus, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Which closing event produced a report.
///
/// A tender gets at most one report of each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Written by the auto-close scheduler at the deadline. It is an
    /// inventory of what was received: counts and metadata, never amounts.
    Closing,
    /// Written by the first buyer-triggered opening, with unsealed amounts.
    Opening,
}

impl ReportKind {
    /// The stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closing => "closing",
            Self::Opening => "opening",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "closing" => Ok(Self::Closing),
            "opening" => Ok(Self::Opening),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// The status of a report. Reports are immutable, so only `open` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// The report is on record
    Open,
}

/// Per-offer outcome tag in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SummaryStatus {
    /// The offer is valid
    #[serde(rename = "OK")]
    Ok,
    /// The offer's envelope failed to authenticate
    #[serde(rename = "DECRYPTION_FAILED")]
    DecryptionFailed,
}

impl SummaryStatus {
    /// The exported representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::DecryptionFailed => "DECRYPTION_FAILED",
        }
    }
}

/// One line of a report's offers summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSummary {
    /// The offer's plaintext number
    pub offer_number: String,
    /// Supplier display name
    pub supplier_name: String,
    /// Unsealed amount; always `None` in closing reports and for failed offers
    pub amount: Option<Decimal>,
    /// Submission time
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    /// Outcome tag
    pub status: SummaryStatus,
}

impl From<&OpenedOffer> for OfferSummary {
    fn from(opened: &OpenedOffer) -> Self {
        Self {
            offer_number: opened.offer.offer_number.clone(),
            supplier_name: opened.offer.supplier_name.clone(),
            amount: opened.financial.as_ref().map(|f| f.total_amount),
            submitted_at: opened.offer.submitted_at,
            status: if opened.decryption_failed {
                SummaryStatus::DecryptionFailed
            } else {
                SummaryStatus::Ok
            },
        }
    }
}

/// The aggregate counts of a report.
///
/// `valid + invalid == received` holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Every offer handed to the generator
    pub total_offers_received: u32,
    /// Offers that did not fail decryption
    pub total_valid_offers: u32,
    /// Offers that failed decryption
    pub total_invalid_offers: u32,
}

impl ReportTotals {
    /// Count the offers in `offers`
    pub fn count(offers: &[OpenedOffer]) -> Self {
        let received = offers.len() as u32;
        let invalid = offers.iter().filter(|o| o.decryption_failed).count() as u32;
        Self {
            total_offers_received: received,
            total_valid_offers: received - invalid,
            total_invalid_offers: invalid,
        }
    }
}

/// The immutable summary of a tender's offers at a closing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningReport {
    /// The report's identifier
    pub id: ReportId,
    /// The tender
    pub tender_id: TenderId,
    /// Which event produced it
    pub kind: ReportKind,
    /// The actor who opened; `None` when the scheduler closed the tender
    pub opened_by: Option<UserId>,
    /// Aggregate counts
    #[serde(flatten)]
    pub totals: ReportTotals,
    /// One line per offer, in submission order
    pub offers_summary: Vec<OfferSummary>,
    /// When the report was generated
    #[serde(with = "time::serde::rfc3339")]
    pub opened_at: OffsetDateTime,
    /// Always `open`
    pub status: ReportStatus,
}

/// A flat record of the report export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow<'a> {
    /// The offer's plaintext number
    pub offer_number: &'a str,
    /// Supplier display name
    pub supplier_name: &'a str,
    /// Unsealed amount, if known
    pub amount: Option<Decimal>,
    /// Submission time in RFC 3339
    pub submitted_at: String,
    /// `OK` or `DECRYPTION_FAILED`
    pub status: &'static str,
}

impl OpeningReport {
    /// Build a report from the offers it summarizes, preserving their order.
    pub fn generate(
        id: ReportId,
        tender_id: TenderId,
        kind: ReportKind,
        opened_by: Option<UserId>,
        offers: &[OpenedOffer],
        opened_at: OffsetDateTime,
    ) -> Self {
        Self {
            id,
            tender_id,
            kind,
            opened_by,
            totals: ReportTotals::count(offers),
            offers_summary: offers.iter().map(OfferSummary::from).collect(),
            opened_at,
            status: ReportStatus::Open,
        }
    }

    /// The offers summary as flat export records
    pub fn export_rows(&self) -> Vec<ExportRow<'_>> {
        self.offers_summary
            .iter()
            .map(|line| ExportRow {
                offer_number: &line.offer_number,
                supplier_name: &line.supplier_name,
                amount: line.amount,
                submitted_at: line
                    .submitted_at
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| line.submitted_at.to_string()),
                status: line.status.as_str(),
            })
            .collect()
    }

    /// The offers summary as comma-separated values with a header row
    pub fn to_csv(&self) -> String {
        let mut out = String::from("offer_number,supplier_name,amount,submitted_at,status\n");
        for row in self.export_rows() {
            let amount = row.amount.map(|a| a.to_string()).unwrap_or_default();
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                csv_field(row.offer_number),
                csv_field(row.supplier_name),
                amount,
                row.submitted_at,
                row.status
            ));
        }
        out
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}
