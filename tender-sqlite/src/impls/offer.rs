use crate::{
    Db,
    types::{DateTime, OFFER_SELECT, OfferRow, decode_error},
};
use tender_core::{
    models::{Offer, OfferId, TenderId},
    ports::OfferRepository,
};

impl OfferRepository for Db {
    async fn create_offer(&self, offer: &Offer) -> Result<bool, Self::Error> {
        let envelope = offer.envelope.as_ref();
        let result = sqlx::query(
            r#"
            insert into
                offer (
                    id, tender_id, supplier_id, offer_number, status,
                    ciphertext, nonce, key_id, submitted_at, is_deleted
                )
            values
                ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            on conflict (tender_id, offer_number)
                do nothing
            "#,
        )
        .bind(offer.id)
        .bind(offer.tender_id)
        .bind(offer.supplier_id)
        .bind(&offer.offer_number)
        .bind(offer.status.as_str())
        .bind(envelope.map(|e| e.ciphertext.as_slice()))
        .bind(envelope.map(|e| e.nonce.as_slice()))
        .bind(envelope.map(|e| e.key_id.as_str()))
        .bind(DateTime::from(offer.submitted_at))
        .bind(offer.is_deleted)
        .execute(&self.writer)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_offer(&self, offer_id: OfferId) -> Result<Option<Offer>, Self::Error> {
        let query = format!("{OFFER_SELECT} where offer.id = $1");
        sqlx::query_as::<_, OfferRow>(&query)
            .bind(offer_id)
            .fetch_optional(&self.reader)
            .await?
            .map(Offer::try_from)
            .transpose()
    }

    async fn count_offers(&self, tender_id: TenderId) -> Result<u32, Self::Error> {
        let count = sqlx::query_scalar::<_, i64>("select count(*) from offer where tender_id = $1")
            .bind(tender_id)
            .fetch_one(&self.reader)
            .await?;
        u32::try_from(count).map_err(decode_error)
    }

    async fn pending_offers(&self, tender_id: TenderId) -> Result<Vec<Offer>, Self::Error> {
        let query = format!(
            r#"
            {OFFER_SELECT}
            where
                offer.tender_id = $1
            and
                offer.is_deleted = 0
            and
                offer.status in ('submitted', 'received')
            order by
                offer.submitted_at asc, offer.offer_number asc
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
