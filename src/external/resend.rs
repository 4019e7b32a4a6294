use crate::config::ResendConfig;
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutgoingEmail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

const SEND_ENDPOINT: &str = "https://api.resend.com/emails";

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(Clone)]
pub struct ResendService {
    http: Client,
    cfg: ResendConfig,
}

impl ResendService {
    pub fn new(cfg: ResendConfig) -> Self {
        Self {
            http: Client::new(),
            cfg,
        }
    }
}

#[async_trait]
impl Mailer for ResendService {
    fn is_enabled(&self) -> bool {
        !self.cfg.api_key.is_empty()
            && !self.cfg.from_email.is_empty()
            && !self.cfg.notify_email.is_empty()
    }

    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        let body = SendEmailRequest {
            from: &self.cfg.from_email,
            to: [&self.cfg.notify_email],
            subject: &email.subject,
            text: &email.text,
            reply_to: email.reply_to.as_deref(),
        };

        let resp = self
            .http
            .post(SEND_ENDPOINT)
            .bearer_auth(&self.cfg.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AppError::ExternalApiError(format!(
                "Resend send failed: HTTP {}: {}",
                status.as_u16(),
                text
            )));
        }

        let sent: SendEmailResponse = resp.json().await?;
        log::info!("Notification email queued: id={}", sent.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_api_key() {
        let resend = ResendService::new(ResendConfig::default());
        assert!(!resend.is_enabled());

        let resend = ResendService::new(ResendConfig {
            api_key: "re_123".to_string(),
            from_email: "site@dobeu.net".to_string(),
            notify_email: "hello@dobeu.net".to_string(),
        });
        assert!(resend.is_enabled());
    }

    #[test]
    fn test_request_body_shape() {
        let body = SendEmailRequest {
            from: "site@dobeu.net",
            to: ["hello@dobeu.net"],
            subject: "New contact request",
            text: "hi",
            reply_to: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["to"][0], "hello@dobeu.net");
        assert!(json.get("reply_to").is_none());
    }
}
