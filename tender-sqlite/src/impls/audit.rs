use crate::Db;
use tender_core::{models::AuditEntry, ports::AuditSink};

impl AuditSink for Db {
    type Error = sqlx::Error;

    async fn record(&self, entry: AuditEntry) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                audit_log (actor_id, entity_type, entity_id, action, message)
            values
                ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.actor_id)
        .bind(entry.entity_type.as_str())
        .bind(entry.entity_id.map(|id| id.to_string()))
        .bind(&entry.action)
        .bind(&entry.message)
        .execute(&self.writer)
        .await?;

        Ok(())
    }
}
