//! The daemon's application: the SQLite store, the configured keyring, the
//! audit log in the same database, and notices written to the log.

use crate::Scheduler;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tender_core::{
    models::{Notification, Tender, UserId},
    ports::{Application, Notifier},
};
use tender_engine::autoclose;
use tender_seal::{Keyring, Seal};
use tender_sqlite::Db;
use time::OffsetDateTime;
use tokio::task::JoinHandle;

/// Notifier that writes each notice to the log.
///
/// Stands in for a mail transport; delivery cannot fail.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    type Error = Infallible;

    async fn send(&self, notification: &Notification) -> Result<(), Self::Error> {
        tracing::info!(
            address = %notification.address,
            subject = %notification.subject,
            "notice sent"
        );
        Ok(())
    }
}

/// The production application.
///
/// Tenders are managed by the buyer who created them; offers may be scored
/// by that buyer or by any configured evaluator.
#[derive(Clone)]
pub struct TenderApp {
    /// The store, also used as the audit log
    pub db: Db,
    /// The sealing component
    pub seal: Seal<Keyring>,
    /// Where cancellation notices go
    pub notifier: LogNotifier,
    /// Upper bound on a single notice delivery
    pub notification_timeout: Duration,
    /// Users who may score any tender's offers
    pub evaluators: Vec<UserId>,
}

impl TenderApp {
    /// Run the auto-close job on `schedule` in a background task.
    ///
    /// The task runs until aborted; with no interval configured it finishes
    /// straight away.
    pub fn spawn_auto_close(self: Arc<Self>, schedule: Scheduler) -> JoinHandle<()> {
        let batch_size = schedule.batch_size;
        tokio::spawn(async move {
            schedule
                .schedule(move |_tick| {
                    let app = Arc::clone(&self);
                    async move { autoclose::run_once(&*app, batch_size).await }
                })
                .await
        })
    }
}

impl Application for TenderApp {
    type Repository = Db;
    type Sealer = Seal<Keyring>;
    type Audit = Db;
    type Notifier = LogNotifier;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn sealer(&self) -> &Self::Sealer {
        &self.seal
    }

    fn audit(&self) -> &Self::Audit {
        &self.db
    }

    fn notifier(&self) -> &Self::Notifier {
        &self.notifier
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }

    fn notification_timeout(&self) -> Duration {
        self.notification_timeout
    }

    async fn can_manage_tender(&self, actor: UserId, tender: &Tender) -> bool {
        actor == tender.buyer_id
    }

    async fn can_evaluate(&self, actor: UserId, tender: &Tender) -> bool {
        actor == tender.buyer_id || self.evaluators.contains(&actor)
    }
}
