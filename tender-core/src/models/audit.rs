use super::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of entity an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A tender
    Tender,
    /// An offer
    Offer,
    /// An opening report
    OpeningReport,
}

impl EntityType {
    /// The stored representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tender => "tender",
            Self::Offer => "offer",
            Self::OpeningReport => "opening_report",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry for the audit sink.
///
/// `actor_id` is `None` for actions taken by the system itself, such as the
/// auto-close scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Who acted
    pub actor_id: Option<UserId>,
    /// What kind of entity was touched
    pub entity_type: EntityType,
    /// Which entity, when a single one is concerned
    pub entity_id: Option<uuid::Uuid>,
    /// A short verb, e.g. `publish` or `open_offers`
    pub action: String,
    /// Human-readable summary, typically the before/after state
    pub message: String,
}

impl AuditEntry {
    /// Construct an entry about a single entity
    pub fn new(
        actor_id: Option<UserId>,
        entity_type: EntityType,
        entity_id: impl Into<uuid::Uuid>,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            actor_id,
            entity_type,
            entity_id: Some(entity_id.into()),
            action: action.into(),
            message: message.into(),
        }
    }
}
