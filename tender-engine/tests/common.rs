#![allow(dead_code)]

use rust_decimal::Decimal;
use std::{
    str::FromStr,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration as StdDuration,
};
use tender_core::{
    models::{AuditEntry, FinancialPayload, Notification, Participant, SupplierId, Tender, UserId},
    ports::{Application, AuditSink, Notifier},
};
use tender_engine::lifecycle::{self, NewTender};
use tender_seal::{Keyring, Seal, SecretKey};
use tender_sqlite::{Db, config::SqliteConfig};
use time::{Duration, OffsetDateTime, macros::datetime};

pub const T0: OffsetDateTime = datetime!(2026-03-02 09:00:00 UTC);

/// Audit sink that keeps entries in memory and can be told to fail.
#[derive(Default)]
pub struct RecordingAudit {
    pub entries: Mutex<Vec<AuditEntry>>,
    pub failing: AtomicBool,
}

impl RecordingAudit {
    pub fn actions(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.action.clone())
            .collect()
    }
}

impl AuditSink for RecordingAudit {
    type Error = std::io::Error;

    async fn record(&self, entry: AuditEntry) -> Result<(), Self::Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("audit log unavailable"));
        }
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}

/// Notifier that refuses `unreachable` addresses and hangs on `slow` ones.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

impl Notifier for RecordingNotifier {
    type Error = std::io::Error;

    async fn send(&self, notification: &Notification) -> Result<(), Self::Error> {
        if notification.address.contains("unreachable") {
            return Err(std::io::Error::other("mailbox unavailable"));
        }
        if notification.address.contains("slow") {
            tokio::time::sleep(StdDuration::from_secs(30)).await;
        }
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub db: Db,
    pub seal: Seal<Keyring>,
    pub audit: RecordingAudit,
    pub notifier: RecordingNotifier,
    pub evaluators: Vec<UserId>,
    now: Mutex<OffsetDateTime>,
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        Ok(Self {
            db: Db::open(&SqliteConfig::default()).await?,
            seal: Seal::new(Keyring::single("k1", SecretKey::generate())),
            audit: RecordingAudit::default(),
            notifier: RecordingNotifier::default(),
            evaluators: vec![UserId::new_v4()],
            now: Mutex::new(T0),
        })
    }

    pub fn set_now(&self, now: OffsetDateTime) {
        *self.now.lock().unwrap() = now;
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }

    pub fn evaluator(&self) -> UserId {
        self.evaluators[0]
    }

    /// A published tender with the given deadline and opening date offsets
    /// from the current time.
    pub async fn published_tender(
        &self,
        reference: &str,
        deadline_in: Duration,
        opening_in: Duration,
    ) -> anyhow::Result<Tender> {
        let buyer = UserId::new_v4();
        let now = self.now();
        let draft = lifecycle::create_tender(
            self,
            buyer,
            NewTender {
                reference: reference.to_owned(),
                title: format!("Framework agreement {reference}"),
                deadline: now + deadline_in,
                opening_date: now + opening_in,
            },
        )
        .await?;
        Ok(lifecycle::publish(self, draft.id, buyer).await?)
    }

    pub async fn supplier(&self, name: &str, email: Option<&str>) -> anyhow::Result<SupplierId> {
        let supplier_id = SupplierId::new_v4();
        self.db
            .register_supplier(&Participant {
                supplier_id,
                display_name: name.to_owned(),
                email: email.map(str::to_owned),
            })
            .await?;
        Ok(supplier_id)
    }
}

impl Application for TestApp {
    type Repository = Db;
    type Sealer = Seal<Keyring>;
    type Audit = RecordingAudit;
    type Notifier = RecordingNotifier;

    fn database(&self) -> &Self::Repository {
        &self.db
    }

    fn sealer(&self) -> &Self::Sealer {
        &self.seal
    }

    fn audit(&self) -> &Self::Audit {
        &self.audit
    }

    fn notifier(&self) -> &Self::Notifier {
        &self.notifier
    }

    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }

    fn notification_timeout(&self) -> StdDuration {
        StdDuration::from_millis(200)
    }

    async fn can_manage_tender(&self, actor: UserId, tender: &Tender) -> bool {
        actor == tender.buyer_id
    }

    async fn can_evaluate(&self, actor: UserId, tender: &Tender) -> bool {
        actor == tender.buyer_id || self.evaluators.contains(&actor)
    }
}

pub fn payload(amount: &str) -> FinancialPayload {
    FinancialPayload {
        total_amount: Decimal::from_str(amount).unwrap(),
        financial_proposal: Some("Unit prices as per annex B".to_owned()),
        payment_terms: Some("Net 30".to_owned()),
    }
}
