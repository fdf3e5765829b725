//! Background loop forwarding pipeline events to the operator chat.
//!
//! [`OperatorNotifications`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and renders each recognised [`PlatformEvent`] into a short human-readable
//! message for the [`TelegramNotifier`]. It shuts down when the bus sender is
//! dropped.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;

use crate::bus::{event_types, PlatformEvent};
use crate::telegram::TelegramNotifier;

/// Background service delivering operator notifications.
pub struct OperatorNotifications;

impl OperatorNotifications {
    /// Run the notification loop until the bus closes.
    pub async fn run(
        notifier: Arc<TelegramNotifier>,
        mut receiver: broadcast::Receiver<PlatformEvent>,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let Some(text) = render(&event) else {
                        continue;
                    };
                    if let Err(e) = notifier.send(&text).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            "Failed to deliver operator notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Operator notifications lagged, events skipped");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, operator notifications shutting down");
                    break;
                }
            }
        }
    }
}

fn field<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload.get(key).unwrap_or(&Value::Null)
}

/// Render an event into message text. Unknown events yield `None`.
pub fn render(event: &PlatformEvent) -> Option<String> {
    let p = &event.payload;
    let id = event
        .source_entity_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "?".into());

    let text = match event.event_type.as_str() {
        event_types::CAMPAIGN_ENRICHED => format!("🧭 Campaign #{id} enriched with brand metadata."),
        event_types::THEMES_GENERATED => format!(
            "✅ Campaign #{id}: {} of {} themes generated.",
            field(p, "generated"),
            field(p, "requested"),
        ),
        event_types::THEME_SELECTED => format!(
            "🎯 Theme #{id} selected for campaign #{}. Generating {} posts.",
            field(p, "campaign_id"),
            field(p, "planned_posts"),
        ),
        event_types::POSTS_GENERATED => format!(
            "📝 Theme #{id}: {} posts saved ({} fallback, {} failed batches).",
            field(p, "saved"),
            field(p, "fallbacks"),
            field(p, "failed_batches"),
        ),
        event_types::POSTS_FAILED => format!(
            "❌ Post generation failed for theme #{id}: {}",
            p.get("error").and_then(Value::as_str).unwrap_or("unknown error"),
        ),
        event_types::IMAGES_FINISHED => format!(
            "🖼️ Post #{id}: images {} ({} of {} generated).",
            p.get("status").and_then(Value::as_str).unwrap_or("finished"),
            field(p, "succeeded"),
            field(p, "requested"),
        ),
        event_types::IMAGES_FAILED => format!(
            "❌ Image generation failed for post #{id}: {}",
            p.get("error").and_then(Value::as_str).unwrap_or("unknown error"),
        ),
        _ => return None,
    };
    Some(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::bus::EventBus;
    use crate::telegram::TelegramConfig;

    #[test]
    fn renders_posts_generated() {
        let event = PlatformEvent::new(event_types::POSTS_GENERATED)
            .with_source("theme", 7)
            .with_payload(json!({"saved": 3, "fallbacks": 1, "failed_batches": 0}));
        let text = render(&event).unwrap();
        assert!(text.contains("Theme #7"));
        assert!(text.contains("3 posts saved (1 fallback, 0 failed batches)"));
    }

    #[test]
    fn renders_failure_with_error_text() {
        let event = PlatformEvent::new(event_types::POSTS_FAILED)
            .with_source("theme", 2)
            .with_payload(json!({"error": "campaign vanished"}));
        assert!(render(&event).unwrap().ends_with("campaign vanished"));
    }

    #[test]
    fn unknown_events_are_ignored() {
        assert!(render(&PlatformEvent::new("something.else")).is_none());
    }

    #[tokio::test]
    async fn loop_exits_when_bus_is_dropped() {
        let bus = EventBus::default();
        let notifier = Arc::new(TelegramNotifier::new(TelegramConfig::default()));
        let handle = tokio::spawn(OperatorNotifications::run(notifier, bus.subscribe()));

        bus.publish(PlatformEvent::new(event_types::THEME_SELECTED).with_source("theme", 1));
        drop(bus);

        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .expect("loop should exit")
            .unwrap();
    }
}
