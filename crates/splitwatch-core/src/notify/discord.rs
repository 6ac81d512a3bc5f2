use super::Notifier;
use crate::errors::NotifyError;
use crate::model::SplitRecord;
use crate::providers::network::check_outbound;
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

const ALERT_TITLE: &str = "Upcoming Stock Split Alert";
const ALERT_COLOR: u32 = 3_447_003;
const ALERT_FOOTER: &str = "Source: splitwatch";

/// Discord-style webhook: one embed per split.
pub struct DiscordNotifier {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            webhook_url: webhook_url.into(),
            client,
        }
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Embed body for one record, stamped with `timestamp` (ISO 8601).
pub fn alert_payload(record: &SplitRecord, timestamp: &str) -> Value {
    json!({
        "embeds": [{
            "title": ALERT_TITLE,
            "color": ALERT_COLOR,
            "fields": [
                {"name": "Ticker", "value": or_na(&record.ticker), "inline": true},
                {"name": "Exchange", "value": or_na(&record.exchange), "inline": true},
                {"name": "Ratio", "value": or_na(&record.ratio), "inline": true},
                {"name": "Company", "value": or_na(&record.company_name), "inline": false},
                {"name": "Buy Before (Ex-Date)", "value": or_na(&record.ex_date), "inline": true},
                {"name": "Fractional Handling", "value": record.classification.as_str(), "inline": true}
            ],
            "footer": {"text": ALERT_FOOTER},
            "timestamp": timestamp
        }]
    })
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, record: &SplitRecord) -> Result<(), NotifyError> {
        check_outbound(&self.webhook_url).map_err(|e| NotifyError::Network {
            message: e.to_string(),
        })?;
        let payload = alert_payload(record, &chrono::Utc::now().to_rfc3339());
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Http {
                status: status.as_u16(),
                body,
            });
        }
        debug!(ticker = %record.ticker, "webhook accepted alert");
        Ok(())
    }
}
