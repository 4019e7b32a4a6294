use crate::error::AppResult;
use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub subject: String,
    pub text: String,
    /// Address replies should go to, usually the submitter.
    pub reply_to: Option<String>,
}

/// Sends staff notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn is_enabled(&self) -> bool;
    async fn send(&self, email: &OutgoingEmail) -> AppResult<()>;
}
