//! Settlement notification email.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("email service unreachable: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("no mail service configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Upload notice; without a link it reports that the Drive upload failed.
    pub fn settlement_uploaded(event_name: &str, drive_link: Option<&str>) -> Self {
        let subject = format!("Abrechnungsunterlagen für Event '{}' wurden hochgeladen", event_name);
        let body = match drive_link {
            Some(link) => format!(
                "Hallo,\n\ndie Abrechnungsunterlagen für '{}' wurden hochgeladen:\n{}\n\nVG,\nEventtool",
                event_name, link
            ),
            None => format!(
                "Hallo,\n\ndie Abrechnungsunterlagen für '{}' wurden als ZIP erstellt, aber der Drive-Upload schlug fehl.\n\nVG,\nEventtool",
                event_name
            ),
        };
        Self { subject, body }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct ResendPayload<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResendErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Sends plain-text mail through the Resend HTTP API.
pub struct ResendNotifier {
    client: reqwest::Client,
    api_key: String,
    sender: String,
    recipient: String,
}

impl ResendNotifier {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }
}

#[async_trait]
impl Notifier for ResendNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let payload = ResendPayload {
            from: &self.sender,
            to: [self.recipient.as_str()],
            subject: &notification.subject,
            text: &notification.body,
        };

        log::info!("Sending settlement notification to {}", self.recipient);
        let response = self
            .client
            .post(RESEND_API_URL)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ResendErrorResponse>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or(body);
        Err(NotifyError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

/// Used when no mail service is configured. The message only goes to the log and the
/// send is reported as failed, so the submission stays pending.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        log::warn!(
            "No mail service configured; notification not sent: {} / {}",
            notification.subject,
            notification.body.replace('\n', " ")
        );
        Err(NotifyError::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_with_link() {
        let n = Notification::settlement_uploaded("Canyoning", Some("https://drive.google.com/file/d/x/view"));
        assert_eq!(n.subject, "Abrechnungsunterlagen für Event 'Canyoning' wurden hochgeladen");
        assert!(n.body.contains("wurden hochgeladen:\nhttps://drive.google.com/file/d/x/view\n"));
    }

    #[test]
    fn test_notification_without_link() {
        let n = Notification::settlement_uploaded("Canyoning", None);
        assert!(n.body.contains("aber der Drive-Upload schlug fehl"));
    }

    #[test]
    fn test_payload_shape() {
        let payload = ResendPayload {
            from: "eventtool@example.org",
            to: ["kasse@example.org"],
            subject: "s",
            text: "b",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["to"], serde_json::json!(["kasse@example.org"]));
        assert_eq!(value["text"], "b");
    }

    #[tokio::test]
    async fn test_log_notifier_reports_not_sent() {
        let n = Notification::settlement_uploaded("Canyoning", None);
        assert!(matches!(LogNotifier.send(&n).await, Err(NotifyError::NotConfigured)));
    }
}
