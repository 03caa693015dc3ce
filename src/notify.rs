use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DonationCreated,
    DonationAccepted,
    DonationDelivered,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub donation_id: Uuid,
    pub recipient_id: Option<Uuid>,
}

/// Contract with the external notification service. Delivery and retry are
/// the notifier's concern; the core only emits logical events.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: NotificationEvent) -> anyhow::Result<()>;
}

/// Default implementation: logs the event for the external dispatcher to pick
/// up. Also used as the test fake.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: NotificationEvent) -> anyhow::Result<()> {
        tracing::info!(
            kind = ?event.kind,
            donation_id = %event.donation_id,
            recipient_id = ?event.recipient_id,
            "notification event"
        );
        Ok(())
    }
}

/// Fire-and-forget dispatch after a committed write. A failed notification
/// never rolls back the committed state.
pub fn dispatch(state: &AppState, event: NotificationEvent) {
    let notifier = state.notifier.clone();
    tokio::spawn(async move {
        if let Err(e) = notifier.notify(event).await {
            tracing::warn!(error = %e, "notification dispatch failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_notifier_accepts_events() {
        let event = NotificationEvent {
            kind: EventKind::DonationAccepted,
            donation_id: Uuid::new_v4(),
            recipient_id: Some(Uuid::new_v4()),
        };
        LogNotifier.notify(event).await.expect("log notifier never fails");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let event = NotificationEvent {
            kind: EventKind::DonationCreated,
            donation_id: Uuid::new_v4(),
            recipient_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "donation_created");
    }
}
