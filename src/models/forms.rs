use crate::entities::PrivacyRequestType;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContactRequest {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    #[schema(example = "web-development")]
    pub service: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrivacyRequest {
    pub name: String,
    pub email: String,
    pub request_type: PrivacyRequestType,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsletterSubscribeRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FormSubmissionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewsletterSubscribeResponse {
    pub success: bool,
    pub message: String,
    pub already_subscribed: bool,
}
