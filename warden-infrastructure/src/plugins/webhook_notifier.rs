// Webhook delivery for notable violations.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use warden_domain::ports::{NotificationPlugin, PluginMetadata};
use warden_domain::Violation;

fn payload(violation: &Violation) -> Value {
    json!({
        "player_id": violation.player_id,
        "game_id": violation.game_id,
        "violation_type": violation.violation_type.as_str(),
        "rule_id": violation.rule_id,
        "severity": violation.severity,
        "risk_level": violation.risk_level().as_str(),
        "timestamp": violation.timestamp,
        "details": violation.details,
    })
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl NotificationPlugin for WebhookNotifier {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "webhook_notifier",
            "1.0.0",
            "posts notable violations to a webhook",
        )
    }

    async fn notify(&self, violation: &Violation) -> anyhow::Result<()> {
        self.client
            .post(&self.url)
            .json(&payload(violation))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_domain::ViolationType;

    #[test]
    fn payload_carries_risk_level_bucket() {
        let violation = Violation::new(
            "p1",
            "g1",
            ViolationType::ThresholdExceeded,
            "speed_cap",
            4.5,
            100.0,
        );
        let body = payload(&violation);
        assert_eq!(body["risk_level"], json!("HIGH"));
        assert_eq!(body["violation_type"], json!("threshold_exceeded"));

        let mild = Violation::new("p1", "g1", ViolationType::CustomRule, "soft", 1.0, 100.0);
        assert_eq!(payload(&mild)["risk_level"], json!("LOW"));
    }
}
