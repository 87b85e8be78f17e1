use crate::models::Notification;

/// Outbound notification channel (email, push, ...).
pub trait Notifier: Send + Sync {
    /// Error type for a failed delivery
    type Error: std::error::Error + Send + Sync + 'static;

    /// Deliver one message.
    fn send(
        &self,
        notification: &Notification,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
