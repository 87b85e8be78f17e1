#![warn(missing_docs)]
//! A reference SQLite backend for the tender lifecycle.
//!
//! [`Db`] implements every repository port of `tender-core`, the participant
//! directory and the audit sink. Status changes are conditional updates on the
//! expected prior status, and the multi-row writes (cancellation with its
//! offer cascade, a ranking batch) each run in a single transaction.

use sqlx::sqlite;
use std::{str::FromStr, time::Duration};
use tender_core::models::Participant;
use tokio::try_join;

pub mod config;
mod impls;
pub mod types;

use config::SqliteConfig;

/// SQLite database implementation of the tender repositories.
///
/// This struct provides separate reader and writer connection pools to a SQLite database.
/// The separation of read and write connections follows SQLite best practices for
/// Write-Ahead Logging (WAL) mode.
///
/// # Connection Management
///
/// - `reader`: A connection pool for read operations, allowing concurrent reads
/// - `writer`: A single-connection pool for write operations, ensuring serialized writes
///
/// # Example
///
/// ```no_run
/// # use tender_sqlite::{Db, config::SqliteConfig};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Db::open(&SqliteConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Db {
    /// Connection pool for read operations
    pub reader: sqlx::Pool<sqlx::Sqlite>,
    /// Connection pool for write operations (limited to 1 connection)
    pub writer: sqlx::Pool<sqlx::Sqlite>,
}

impl Db {
    /// Open a connection to the specified SQLite database.
    ///
    /// Creates a new database if one doesn't exist (when `create_if_missing` is true)
    /// and applies all pending migrations.
    ///
    /// # Errors
    ///
    /// Returns `sqlx::Error` if the connection fails or a migration fails to apply.
    pub async fn open(config: &SqliteConfig) -> Result<Self, sqlx::Error> {
        let db_path = config
            .database_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let options =
            sqlite::SqliteConnectOptions::from_str(db_path.as_deref().unwrap_or(":memory:"))?
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true)
                .journal_mode(sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlite::SqliteSynchronous::Normal)
                .pragma("journal_size_limit", "27103364")
                .pragma("temp_store", "memory")
                .create_if_missing(config.create_if_missing);

        let reader = sqlite::SqlitePoolOptions::new().connect_with(options.clone());
        let writer = sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options);

        let (reader, writer) = try_join!(reader, writer)?;

        sqlx::migrate!("./schema").run(&writer).await?;

        tracing::info!(
            path = db_path.as_deref().unwrap_or(":memory:"),
            "opened tender database"
        );

        Ok(Self { reader, writer })
    }

    /// Insert or refresh a supplier's directory entry.
    ///
    /// The directory is owned by the profile management; this is how it (or
    /// a test) feeds the names and contact addresses the lifecycle reads.
    pub async fn register_supplier(&self, participant: &Participant) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            insert into
                supplier (id, display_name, email)
            values
                ($1, $2, $3)
            on conflict (id) do update set
                display_name = excluded.display_name,
                email = excluded.email
            "#,
        )
        .bind(participant.supplier_id)
        .bind(&participant.display_name)
        .bind(&participant.email)
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    /// Close both pools, waiting for in-flight queries to finish.
    pub async fn close(&self) {
        self.writer.close().await;
        self.reader.close().await;
    }
}
