use crate::middlewares::current_user;
use crate::models::*;
use crate::services::{ProfileService, VerificationService};
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    post,
    path = "/send-sms-verification",
    tag = "phone",
    request_body = SendSmsVerificationRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Verification code sent", body = SendSmsVerificationResponse),
        (status = 400, description = "Invalid or already verified phone number", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 429, description = "A code is still outstanding", body = ErrorResponse),
        (status = 500, description = "SMS gateway or database failure", body = ErrorResponse)
    )
)]
pub async fn send_sms_verification(
    verification_service: web::Data<VerificationService>,
    req: HttpRequest,
    request: web::Json<SendSmsVerificationRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match verification_service.send_code(&user.sub, &request.phone).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/verify-sms-code",
    tag = "phone",
    request_body = VerifySmsCodeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Phone number verified", body = VerifySmsCodeResponse),
        (status = 400, description = "Bad format, no valid code, expired or wrong code", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 429, description = "Attempt ceiling reached", body = ErrorResponse)
    )
)]
pub async fn verify_sms_code(
    verification_service: web::Data<VerificationService>,
    req: HttpRequest,
    request: web::Json<VerifySmsCodeRequest>,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match verification_service.verify_code(&user.sub, &request.code).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/check-phone-verification",
    tag = "phone",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Phone verification state", body = PhoneVerificationStatus),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn check_phone_verification(
    profile_service: web::Data<ProfileService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let user = match current_user(&req) {
        Ok(user) => user,
        Err(e) => return Ok(e.error_response()),
    };

    match profile_service.phone_status(&user.sub).await {
        Ok(status) => Ok(HttpResponse::Ok().json(status)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn verification_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/send-sms-verification", web::post().to(send_sms_verification))
        .route("/verify-sms-code", web::post().to(verify_sms_code))
        .route(
            "/check-phone-verification",
            web::get().to(check_phone_verification),
        );
}
