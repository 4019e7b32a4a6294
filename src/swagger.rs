use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PrivacyRequestType;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::verification::send_sms_verification,
        handlers::verification::verify_sms_code,
        handlers::verification::check_phone_verification,
        handlers::forms::submit_contact,
        handlers::forms::submit_privacy_request,
        handlers::forms::subscribe_newsletter,
        handlers::forms::health,
    ),
    components(
        schemas(
            SendSmsVerificationRequest,
            SendSmsVerificationResponse,
            VerifySmsCodeRequest,
            VerifySmsCodeResponse,
            PhoneVerificationStatus,
            ContactRequest,
            PrivacyRequest,
            PrivacyRequestType,
            NewsletterSubscribeRequest,
            NewsletterSubscribeResponse,
            FormSubmissionResponse,
            HealthResponse,
            ErrorResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "phone", description = "Phone number verification API"),
        (name = "forms", description = "Public site forms API"),
        (name = "health", description = "Liveness probe"),
    ),
    info(
        title = "DOBEU Backend API",
        version = "1.0.0",
        description = "DOBEU website backend REST API documentation",
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
