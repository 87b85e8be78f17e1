use crate::{
    Db,
    types::{DateTime, OFFER_SELECT, OfferRow},
};
use tender_core::{
    models::{Offer, OfferId, RankedOffer, ScoreKind, ScoreRecord, TenderId},
    ports::EvaluationRepository,
};
use time::OffsetDateTime;

impl EvaluationRepository for Db {
    async fn record_score(
        &self,
        offer_id: OfferId,
        kind: ScoreKind,
        record: &ScoreRecord,
    ) -> Result<bool, Self::Error> {
        let prefix = match kind {
            ScoreKind::Technical => "technical",
            ScoreKind::Financial => "financial",
        };
        let query = format!(
            r#"
            update
                offer
            set
                {prefix}_score = $2,
                {prefix}_comments = $3,
                {prefix}_evaluator_id = $4,
                {prefix}_evaluated_at = $5
            where
                id = $1
            and
                is_deleted = 0
            "#
        );

        let mut tx = self.writer.begin().await?;

        let result = sqlx::query(&query)
            .bind(offer_id)
            .bind(record.score)
            .bind(&record.comments)
            .bind(record.evaluator_id)
            .bind(DateTime::from(record.evaluated_at))
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() != 1 {
            return Ok(false);
        }

        // A ranking computed from the old score is stale for the whole tender
        sqlx::query(
            r#"
            update
                offer
            set
                final_score = null,
                ranking = null,
                evaluation_completed_at = null
            where
                tender_id = (select tender_id from offer where id = $1)
            "#,
        )
        .bind(offer_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn apply_ranking(
        &self,
        tender_id: TenderId,
        ranking: &[RankedOffer],
        at: OffsetDateTime,
    ) -> Result<(), Self::Error> {
        let at = DateTime::from(at);
        let mut tx = self.writer.begin().await?;

        // The new ranking replaces the previous one entirely
        sqlx::query(
            r#"
            update
                offer
            set
                final_score = null,
                ranking = null,
                evaluation_completed_at = null
            where
                tender_id = $1
            "#,
        )
        .bind(tender_id)
        .execute(&mut *tx)
        .await?;

        for ranked in ranking {
            sqlx::query(
                r#"
                update
                    offer
                set
                    final_score = $3,
                    ranking = $4,
                    evaluation_completed_at = $5
                where
                    id = $1
                and
                    tender_id = $2
                "#,
            )
            .bind(ranked.offer_id)
            .bind(tender_id)
            .bind(ranked.final_score)
            .bind(i64::from(ranked.ranking))
            .bind(at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn evaluated_offers(&self, tender_id: TenderId) -> Result<Vec<Offer>, Self::Error> {
        let query = format!(
            r#"
            {OFFER_SELECT}
            where
                offer.tender_id = $1
            and
                offer.is_deleted = 0
            and
                offer.ranking is not null
            order by
                offer.ranking asc
            "#
        );
        sqlx::query_as::<_, OfferRow>(&query)
            .bind(tender_id)
            .fetch_all(&self.reader)
            .await?
            .into_iter()
            .map(Offer::try_from)
            .collect()
    }
}
