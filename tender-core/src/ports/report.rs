use crate::models::{OpeningReport, ReportKind, TenderId};

/// Repository interface for opening reports.
pub trait ReportRepository: super::Repository {
    /// Store a report unless one of the same kind already exists for the tender.
    ///
    /// # Returns
    ///
    /// The authoritative report, paired with `true` if it is the one just
    /// passed in, or `false` if an earlier report was kept instead.
    fn insert_report(
        &self,
        report: &OpeningReport,
    ) -> impl Future<Output = Result<(OpeningReport, bool), Self::Error>> + Send;

    /// Retrieve the report of `kind` for a tender.
    fn get_report(
        &self,
        tender_id: TenderId,
        kind: ReportKind,
    ) -> impl Future<Output = Result<Option<OpeningReport>, Self::Error>> + Send;
}
