use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendSmsVerificationRequest {
    #[schema(example = "(555) 123-4567")]
    pub phone: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendSmsVerificationResponse {
    pub success: bool,
    pub message: String,
    /// Seconds until the code expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySmsCodeRequest {
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySmsCodeResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PhoneVerificationStatus {
    pub phone_verified: bool,
    pub phone: Option<String>,
    pub is_new_user: bool,
}
