use crate::domain::ports::{Delivery, DeliveryStatus};
use async_trait::async_trait;
use serde_json::json;

/// Slack incoming webhook delivery.
pub struct SlackWebhook {
    webhook_url: String,
    http: reqwest::Client,
}

impl SlackWebhook {
    pub fn new(webhook_url: String) -> Self {
        Self {
            webhook_url,
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Delivery for SlackWebhook {
    async fn deliver(&self, payload: &str) -> DeliveryStatus {
        let body = json!({
            "text": payload,
            "unfurl_links": false,
            "unfurl_media": false,
        });

        let resp = match self.http.post(&self.webhook_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => return DeliveryStatus::Failed(format!("request failed: {}", e)),
        };

        let status = resp.status();
        if status.is_success() {
            tracing::info!("Menus sent to Slack");
            return DeliveryStatus::Delivered;
        }

        let text = resp.text().await.unwrap_or_default();
        tracing::warn!(status = %status, body = %text, "Slack webhook returned non-success");
        DeliveryStatus::Failed(format!("Slack webhook returned {}", status))
    }
}
