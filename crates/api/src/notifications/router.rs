//! Event-to-notification routing engine.
//!
//! [`NotificationRouter`] subscribes to the ledger event bus and, for each
//! event, writes one notification row per target domain and sends an email
//! when the domain has a contact address and SMTP is configured. Handlers
//! publish events fire-and-forget; delivery failures never propagate back
//! into the request path.

use scope3_core::events::{
    EVENT_CLAIM_CREATED, EVENT_CLAIM_EXPIRED, EVENT_CLAIM_EXPIRING, EVENT_PARTNERSHIP_ACCEPTED,
    EVENT_PARTNERSHIP_DECLINED, EVENT_PARTNERSHIP_REQUESTED, EVENT_TRANSFER_APPROVED,
    EVENT_TRANSFER_REJECTED, EVENT_TRANSFER_REQUESTED,
};
use scope3_core::types::DbId;
use scope3_db::models::notification::CreateNotification;
use scope3_db::repositories::{DomainRepo, NotificationRepo};
use scope3_db::DbPool;
use scope3_events::{EmailDelivery, LedgerEvent};
use tokio::sync::broadcast;

/// Routes ledger events to domain notifications.
pub struct NotificationRouter {
    pool: DbPool,
    mailer: Option<EmailDelivery>,
}

impl NotificationRouter {
    /// Create a new router. `mailer` is `None` when SMTP is not configured;
    /// in-app notifications are still written in that case.
    pub fn new(pool: DbPool, mailer: Option<EmailDelivery>) -> Self {
        Self { pool, mailer }
    }

    /// Run the main routing loop.
    ///
    /// Subscribes to the event bus via `receiver` and processes each event.
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](scope3_events::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<LedgerEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.route_event(&event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to route event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// Route a single event to all of its target domains. A failure for
    /// one target does not stop delivery to the others.
    async fn route_event(&self, event: &LedgerEvent) -> Result<(), sqlx::Error> {
        let message = message_for(event);
        for &domain_id in &event.target_domain_ids {
            if let Err(e) = self.route_to_domain(domain_id, event, &message).await {
                tracing::error!(
                    error = %e,
                    domain_id,
                    event_type = %event.event_type,
                    "Failed to deliver notification"
                );
            }
        }
        Ok(())
    }

    async fn route_to_domain(
        &self,
        domain_id: DbId,
        event: &LedgerEvent,
        message: &str,
    ) -> Result<(), sqlx::Error> {
        NotificationRepo::create(
            &self.pool,
            &CreateNotification {
                domain_id,
                event_type: event.event_type.clone(),
                message: message.to_string(),
                metadata: event.payload.clone(),
            },
        )
        .await?;

        if let Some(mailer) = &self.mailer {
            let contact = DomainRepo::find_by_id(&self.pool, domain_id)
                .await?
                .and_then(|d| d.contact_email);
            if let Some(to) = contact {
                if let Err(e) = mailer.deliver(&to, &event.event_type, message).await {
                    tracing::warn!(
                        error = %e,
                        domain_id,
                        event_type = %event.event_type,
                        "Notification email failed"
                    );
                }
            }
        }

        Ok(())
    }
}

/// Human-readable message for an event, built from its payload.
fn message_for(event: &LedgerEvent) -> String {
    let p = &event.payload;
    let amount = p["amount"].as_f64().unwrap_or_default();
    let intervention = p["intervention_name"].as_str().unwrap_or("an intervention");

    match event.event_type.as_str() {
        EVENT_CLAIM_CREATED => {
            format!("Claim of {amount} tCO2e created against {intervention}")
        }
        EVENT_CLAIM_EXPIRED => {
            format!("Your claim of {amount} tCO2e against {intervention} has expired")
        }
        EVENT_CLAIM_EXPIRING => {
            let days = p["days_until_expiry"].as_i64().unwrap_or_default();
            format!(
                "Your claim of {amount} tCO2e against {intervention} expires in {days} day(s)"
            )
        }
        EVENT_TRANSFER_REQUESTED => {
            format!("Incoming transfer of {amount} tCO2e from {intervention} awaits your decision")
        }
        EVENT_TRANSFER_APPROVED => {
            format!("Transfer of {amount} tCO2e from {intervention} was approved")
        }
        EVENT_TRANSFER_REJECTED => {
            format!("Transfer of {amount} tCO2e from {intervention} was rejected; the balance was restored")
        }
        EVENT_PARTNERSHIP_REQUESTED => "A domain has requested a partnership with you".to_string(),
        EVENT_PARTNERSHIP_ACCEPTED => "Your partnership request was accepted".to_string(),
        EVENT_PARTNERSHIP_DECLINED => "Your partnership request was declined".to_string(),
        other => format!("Ledger event: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_include_amounts_and_intervention_names() {
        let event = LedgerEvent::new(EVENT_TRANSFER_REQUESTED)
            .with_payload(serde_json::json!({
                "amount": 75.5,
                "intervention_name": "Reforestation 2024",
            }));
        let message = message_for(&event);
        assert!(message.contains("75.5"));
        assert!(message.contains("Reforestation 2024"));
    }

    #[test]
    fn unknown_event_types_fall_back_to_generic_message() {
        let event = LedgerEvent::new("something.else");
        assert_eq!(message_for(&event), "Ledger event: something.else");
    }
}
