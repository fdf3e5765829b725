//! Pipeline event bus and operator notifications.
//!
//! - [`EventBus`] is the in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`] is the event envelope published by the pipeline at
//!   each milestone.
//! - [`TelegramNotifier`] sends operator-visible messages to a Telegram chat.
//! - [`OperatorNotifications`] is the background loop that turns bus events
//!   into notifier messages.

pub mod bus;
pub mod notifications;
pub mod telegram;

pub use bus::{event_types, EventBus, PlatformEvent};
pub use notifications::OperatorNotifications;
pub use telegram::{TelegramConfig, TelegramNotifier};
