mod audit;
mod evaluation;
mod offer;
mod participant;
mod report;
mod tender;

pub use audit::{AuditEntry, EntityType};
pub use evaluation::{InvalidScore, RankedOffer, Score, ScoreKind, ScoreRecord, final_score, rank};
pub use offer::{FinancialPayload, OpenedOffer, Offer, OfferStatus, SealedEnvelope};
pub use participant::{Notification, Participant};
pub use report::{
    ExportRow, OfferSummary, OpeningReport, ReportKind, ReportStatus, ReportTotals, SummaryStatus,
};
pub use tender::{
    CancellationStatus, InvalidTransition, Tender, TenderStatus, Transition, UnknownStatus,
};

/// Strongly-typed identifiers.
///
/// Each entity gets a distinct newtype around a UUID so that identifiers
/// cannot be mixed up at compile time. With the `sqlx` feature enabled the
/// identifiers are stored in SQLite as their hyphenated string form.
macro_rules! new_id {
    ($struct:ident) => {
        new_id!($struct, "A newtype wrapper around a uuid");
    };
    ($struct:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $struct(pub uuid::Uuid);

        impl $struct {
            /// Generate a fresh random identifier
            pub fn new_v4() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl From<$struct> for uuid::Uuid {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl From<uuid::Uuid> for $struct {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $struct {
            type Err = <uuid::Uuid as std::str::FromStr>::Err;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        #[cfg(feature = "sqlx")]
        impl sqlx::Type<sqlx::Sqlite> for $struct {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as sqlx::Type<sqlx::Sqlite>>::type_info()
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $struct {
            fn encode_by_ref(
                &self,
                args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                sqlx::Encode::<'q, sqlx::Sqlite>::encode_by_ref(&self.0.to_string(), args)
            }
        }

        #[cfg(feature = "sqlx")]
        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $struct {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let string = <&str as sqlx::Decode<'r, sqlx::Sqlite>>::decode(value)?;
                let value = string.parse()?;
                Ok(value)
            }
        }
    };
}

new_id!(TenderId, "Unique identifier for a tender");
new_id!(OfferId, "Unique identifier for a supplier's offer");
new_id!(ReportId, "Unique identifier for an opening report");
new_id!(
    UserId,
    "Unique identifier for an authenticated actor (buyer, evaluator or administrator)"
);
new_id!(SupplierId, "Unique identifier for a supplier company");
