use crate::{Db, types::ParticipantRow};
use sqlx::QueryBuilder;
use tender_core::{
    models::{Participant, SupplierId},
    ports::ParticipantDirectory,
};

impl ParticipantDirectory for Db {
    async fn participants(
        &self,
        supplier_ids: &[SupplierId],
    ) -> Result<Vec<Participant>, Self::Error> {
        if supplier_ids.is_empty() {
            return Ok(Vec::new());
        }

        // TODO: chunk the id list once a tender can exceed SQLite's bound parameter limit
        let mut query = QueryBuilder::new(
            "select id as supplier_id, display_name, email from supplier where id in (",
        );
        let mut ids = query.separated(", ");
        for supplier_id in supplier_ids {
            ids.push_bind(*supplier_id);
        }
        ids.push_unseparated(") order by display_name asc");

        let rows = query
            .build_query_as::<ParticipantRow>()
            .fetch_all(&self.reader)
            .await?;

        Ok(rows.into_iter().map(Participant::from).collect())
    }
}
