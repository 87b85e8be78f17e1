use super::SupplierId;
use serde::{Deserialize, Serialize};

/// A supplier as seen by the tender workflows: a display name for reports and
/// an optional address for notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The supplier
    pub supplier_id: SupplierId,
    /// Name shown in reports
    pub display_name: String,
    /// Contact address, if the supplier has one on file
    pub email: Option<String>,
}

/// A message handed to the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Destination address
    pub address: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}
