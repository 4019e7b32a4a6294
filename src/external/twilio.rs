use crate::config::TwilioConfig;
use crate::error::{AppError, AppResult};
use crate::external::SmsSender;
use crate::utils::mask_phone;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

const TWILIO_API_BASE: &str = "https://api.twilio.com/2010-04-01";

#[derive(Debug, Deserialize)]
pub struct SendSmsResponse {
    pub sid: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
struct TwilioErrorResponse {
    code: Option<i64>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct TwilioService {
    client: Client,
    config: TwilioConfig,
}

impl TwilioService {
    pub fn new(config: TwilioConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.account_sid.is_empty()
            && !self.config.auth_token.is_empty()
            && !self.config.from_phone.is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            TWILIO_API_BASE, self.config.account_sid
        )
    }
}

#[async_trait]
impl SmsSender for TwilioService {
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()> {
        if !self.is_configured() {
            return Err(AppError::ConfigError(
                "Twilio credentials are not configured".to_string(),
            ));
        }

        let params = [
            ("To", to),
            ("From", self.config.from_phone.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let sent: SendSmsResponse = response.json().await?;
            log::info!(
                "SMS sent to {} (sid={}, status={})",
                mask_phone(to),
                sent.sid,
                sent.status
            );
            Ok(())
        } else {
            let status = response.status();
            let detail = match response.json::<TwilioErrorResponse>().await {
                Ok(err) => format!(
                    "code={} {}",
                    err.code.unwrap_or_default(),
                    err.message.unwrap_or_default()
                ),
                Err(_) => "unreadable error body".to_string(),
            };
            log::error!(
                "SMS to {} failed: HTTP {}: {}",
                mask_phone(to),
                status.as_u16(),
                detail
            );
            Err(AppError::ExternalApiError(format!(
                "SMS sending failed: HTTP {}: {}",
                status.as_u16(),
                detail
            )))
        }
    }
}
