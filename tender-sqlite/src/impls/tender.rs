use crate::{
    Db,
    types::{DateTime, TENDER_COLUMNS, TenderRow},
};
use sqlx::{QueryBuilder, Sqlite};
use tender_core::{
    models::{SupplierId, Tender, TenderId, Transition},
    ports::TenderRepository,
};
use time::OffsetDateTime;

/// Build the status update for `transition`, guarded on the statuses it may
/// start from. `rows_affected() == 1` means this statement won the race.
fn guarded_transition<'a>(
    tender_id: TenderId,
    transition: Transition,
    at: DateTime,
    reason: Option<&'a str>,
) -> QueryBuilder<'a, Sqlite> {
    let stamp = match transition {
        Transition::Publish => "published_at",
        Transition::Close => "closed_at",
        Transition::Cancel => "cancelled_at",
    };

    let mut query = QueryBuilder::new("update tender set status = ");
    query
        .push_bind(transition.target().as_str())
        .push(", ")
        .push(stamp)
        .push(" = ")
        .push_bind(at)
        .push(", updated_at = ")
        .push_bind(at);

    if let Some(reason) = reason {
        query.push(", cancellation_reason = ").push_bind(reason);
    }

    query
        .push(" where id = ")
        .push_bind(tender_id)
        .push(" and is_deleted = 0 and status in (");

    let mut statuses = query.separated(", ");
    for status in transition.allowed_from() {
        statuses.push_bind(status.as_str());
    }
    statuses.push_unseparated(")");

    query
}

impl TenderRepository for Db {
    async fn create_tender(&self, tender: &Tender) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                tender (
                    id, reference, title, buyer_id, status, deadline, opening_date,
                    published_at, closed_at, cancelled_at, cancellation_reason,
                    is_deleted, created_at, updated_at
                )
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(tender.id)
        .bind(&tender.reference)
        .bind(&tender.title)
        .bind(tender.buyer_id)
        .bind(tender.status.as_str())
        .bind(DateTime::from(tender.deadline))
        .bind(DateTime::from(tender.opening_date))
        .bind(tender.published_at.map(DateTime::from))
        .bind(tender.closed_at.map(DateTime::from))
        .bind(tender.cancelled_at.map(DateTime::from))
        .bind(&tender.cancellation_reason)
        .bind(tender.is_deleted)
        .bind(DateTime::from(tender.created_at))
        .bind(DateTime::from(tender.updated_at))
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    async fn get_tender(&self, tender_id: TenderId) -> Result<Option<Tender>, Self::Error> {
        let query = format!("select {TENDER_COLUMNS} from tender where id = $1");
        sqlx::query_as::<_, TenderRow>(&query)
            .bind(tender_id)
            .fetch_optional(&self.reader)
            .await?
            .map(Tender::try_from)
            .transpose()
    }

    async fn transition_tender(
        &self,
        tender_id: TenderId,
        transition: Transition,
        at: OffsetDateTime,
    ) -> Result<bool, Self::Error> {
        let mut query = guarded_transition(tender_id, transition, at.into(), None);
        let result = query.build().execute(&self.writer).await?;
        Ok(result.rows_affected() == 1)
    }

    async fn cancel_tender(
        &self,
        tender_id: TenderId,
        reason: &str,
        at: OffsetDateTime,
    ) -> Result<Option<Vec<SupplierId>>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        let mut query = guarded_transition(tender_id, Transition::Cancel, at.into(), Some(reason));
        let updated = query.build().execute(&mut *tx).await?.rows_affected();
        if updated != 1 {
            tx.rollback().await?;
            return Ok(None);
        }

        let mut suppliers = sqlx::query_scalar::<_, SupplierId>(
            r#"
            update
                offer
            set
                status = 'cancelled',
                is_deleted = 1
            where
                tender_id = $1
            and
                is_deleted = 0
            returning
                supplier_id
            "#,
        )
        .bind(tender_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        suppliers.sort_unstable();
        suppliers.dedup();
        Ok(Some(suppliers))
    }

    async fn due_tenders(
        &self,
        now: OffsetDateTime,
        limit: u32,
    ) -> Result<Vec<Tender>, Self::Error> {
        let query = format!(
            r#"
            select
                {TENDER_COLUMNS}
            from
                tender
            where
                status = 'published'
            and
                is_deleted = 0
            and
                deadline < $1
            order by
                deadline asc, id asc
            limit $2
            "#
        );
        sqlx::query_as::<_, TenderRow>(&query)
            .bind(DateTime::from(now))
            .bind(i64::from(limit))
            .fetch_all(&self.reader)
            .await?
            .into_iter()
            .map(Tender::try_from)
            .collect()
    }
}
