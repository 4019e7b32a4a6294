use crate::error::AppResult;
use async_trait::async_trait;

/// Outbound SMS gateway.
#[async_trait]
pub trait SmsSender: Send + Sync {
    /// `to` is an E.164 number.
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()>;
}
