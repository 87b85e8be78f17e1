use crate::{
    Db,
    types::{DateTime, REPORT_COLUMNS, ReportRow},
};
use sqlx::types::Json;
use tender_core::{
    models::{OpeningReport, ReportKind, TenderId},
    ports::ReportRepository,
};

impl ReportRepository for Db {
    async fn insert_report(
        &self,
        report: &OpeningReport,
    ) -> Result<(OpeningReport, bool), Self::Error> {
        // the unique (tender_id, kind) index arbitrates concurrent generators
        let result = sqlx::query(
            r#"
            insert into
                opening_report (
                    id, tender_id, kind, opened_by,
                    total_offers_received, total_valid_offers, total_invalid_offers,
                    offers_summary, opened_at, status
                )
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'open')
            on conflict (tender_id, kind)
                do nothing
            "#,
        )
        .bind(report.id)
        .bind(report.tender_id)
        .bind(report.kind.as_str())
        .bind(report.opened_by)
        .bind(i64::from(report.totals.total_offers_received))
        .bind(i64::from(report.totals.total_valid_offers))
        .bind(i64::from(report.totals.total_invalid_offers))
        .bind(Json(&report.offers_summary))
        .bind(DateTime::from(report.opened_at))
        .execute(&self.writer)
        .await?;

        if result.rows_affected() == 1 {
            return Ok((report.clone(), true));
        }

        // Read the winner back through the writer so the lookup cannot miss it
        let query = format!(
            "select {REPORT_COLUMNS} from opening_report where tender_id = $1 and kind = $2"
        );
        let existing = sqlx::query_as::<_, ReportRow>(&query)
            .bind(report.tender_id)
            .bind(report.kind.as_str())
            .fetch_one(&self.writer)
            .await?;

        Ok((OpeningReport::try_from(existing)?, false))
    }

    async fn get_report(
        &self,
        tender_id: TenderId,
        kind: ReportKind,
    ) -> Result<Option<OpeningReport>, Self::Error> {
        let query = format!(
            "select {REPORT_COLUMNS} from opening_report where tender_id = $1 and kind = $2"
        );
        sqlx::query_as::<_, ReportRow>(&query)
            .bind(tender_id)
            .bind(kind.as_str())
            .fetch_optional(&self.reader)
            .await?
            .map(OpeningReport::try_from)
            .transpose()
    }
}
