//! Outbound alerts for newly discovered splits.

pub mod discord;

pub use discord::{alert_payload, DiscordNotifier};

use crate::errors::NotifyError;
use crate::model::SplitRecord;
use async_trait::async_trait;

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post one alert. One attempt; the caller decides what a failure means.
    async fn notify(&self, record: &SplitRecord) -> Result<(), NotifyError>;
}
