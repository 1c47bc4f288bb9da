use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::EmailConfig;

/// Transactional email templates known to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    MentorshipRequest,
}

/// One outgoing templated email.
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    pub to: String,
    pub template: Template,
    pub data: serde_json::Value,
}

impl EmailMessage {
    /// Notification telling a mentor that `sender_name` applied with `message`.
    pub fn mentorship_request(to: &str, sender_name: &str, message: &str) -> Self {
        Self {
            to: to.to_string(),
            template: Template::MentorshipRequest,
            data: serde_json::json!({
                "name": sender_name,
                "message": message,
            }),
        }
    }
}

/// Delivery failures. These never become API errors.
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email delivery is not configured")]
    NotConfigured,
    #[error("no template id configured for {0:?}")]
    MissingTemplate(Template),
    #[error("email transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("email provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<(), EmailError>;
}

#[derive(Debug, Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
    dynamic_template_data: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct SendGridRequest<'a> {
    from: SendGridAddress<'a>,
    personalizations: Vec<SendGridPersonalization<'a>>,
    template_id: &'a str,
}

/// Sends template emails through the SendGrid v3 API.
pub struct SendGridEmailSender {
    config: EmailConfig,
    client: reqwest::Client,
}

impl SendGridEmailSender {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self { config, client })
    }

    fn template_id(&self, template: Template) -> Option<&str> {
        let id = match template {
            Template::MentorshipRequest => self.config.mentorship_request_template.as_str(),
        };
        (!id.is_empty()).then_some(id)
    }

    fn endpoint(&self) -> String {
        format!("{}/v3/mail/send", self.config.api_url.trim_end_matches('/'))
    }

    fn build_request<'a>(&'a self, email: &'a EmailMessage, template_id: &'a str) -> SendGridRequest<'a> {
        SendGridRequest {
            from: parse_address(&self.config.from),
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress { email: &email.to, name: None }],
                dynamic_template_data: &email.data,
            }],
            template_id,
        }
    }
}

#[async_trait]
impl EmailSender for SendGridEmailSender {
    async fn send(&self, email: &EmailMessage) -> Result<(), EmailError> {
        let api_key = self.config.api_key.as_deref().ok_or(EmailError::NotConfigured)?;
        let template_id = self
            .template_id(email.template)
            .ok_or(EmailError::MissingTemplate(email.template))?;

        log::info!("📧 Sending {:?} email to {}", email.template, email.to);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&self.build_request(email, template_id))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("✅ Email accepted by provider ({})", status);
        Ok(())
    }
}

/// Splits `Name <addr@host>` into its parts; a bare address has no name.
fn parse_address(raw: &str) -> SendGridAddress<'_> {
    match (raw.find('<'), raw.rfind('>')) {
        (Some(start), Some(end)) if start < end => {
            let name = raw[..start].trim();
            SendGridAddress {
                email: raw[start + 1..end].trim(),
                name: (!name.is_empty()).then_some(name),
            }
        }
        _ => SendGridAddress {
            email: raw.trim(),
            name: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>, template: &str) -> EmailConfig {
        EmailConfig {
            api_key: api_key.map(|k| k.to_string()),
            api_url: "https://api.sendgrid.com/".to_string(),
            from: "Coding Coach <admin@codingcoach.io>".to_string(),
            mentorship_request_template: template.to_string(),
        }
    }

    #[test]
    fn test_parse_address() {
        let named = parse_address("Coding Coach <admin@codingcoach.io>");
        assert_eq!(named.email, "admin@codingcoach.io");
        assert_eq!(named.name, Some("Coding Coach"));

        let bare = parse_address(" admin@codingcoach.io ");
        assert_eq!(bare.email, "admin@codingcoach.io");
        assert_eq!(bare.name, None);
    }

    #[test]
    fn test_sendgrid_payload() {
        let sender = SendGridEmailSender::new(config(Some("key"), "d-123")).unwrap();
        let email = EmailMessage::mentorship_request("mentor@example.com", "Mentee", "Hi!");

        let payload = serde_json::to_value(sender.build_request(&email, "d-123")).unwrap();

        assert_eq!(payload["template_id"], "d-123");
        assert_eq!(payload["from"]["email"], "admin@codingcoach.io");
        assert_eq!(payload["personalizations"][0]["to"][0]["email"], "mentor@example.com");
        assert_eq!(payload["personalizations"][0]["dynamic_template_data"]["name"], "Mentee");
        assert_eq!(payload["personalizations"][0]["dynamic_template_data"]["message"], "Hi!");
        assert_eq!(sender.endpoint(), "https://api.sendgrid.com/v3/mail/send");
    }

    #[tokio::test]
    async fn test_send_without_api_key_fails_fast() {
        let sender = SendGridEmailSender::new(config(None, "d-123")).unwrap();
        let email = EmailMessage::mentorship_request("mentor@example.com", "Mentee", "Hi!");

        assert!(matches!(sender.send(&email).await, Err(EmailError::NotConfigured)));
    }

    #[tokio::test]
    async fn test_send_without_template_fails_fast() {
        let sender = SendGridEmailSender::new(config(Some("key"), "")).unwrap();
        let email = EmailMessage::mentorship_request("mentor@example.com", "Mentee", "Hi!");

        assert!(matches!(
            sender.send(&email).await,
            Err(EmailError::MissingTemplate(Template::MentorshipRequest))
        ));
    }
}
