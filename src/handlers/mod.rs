pub mod forms;
pub mod verification;

use crate::error::AppError;
use actix_web::web;

pub use forms::{TrustedProxies, forms_config};
pub use verification::verification_config;

/// JSON extractor settings: malformed bodies get the standard error envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {err}");
        AppError::ValidationError("Invalid request body".to_string()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{JwtConfig, RateLimitConfig};
    use crate::middlewares::AuthMiddleware;
    use crate::services::{FormService, ProfileService, VerificationService};
    use crate::test_support::{RecordingMailer, RecordingSms, setup_db};
    use crate::utils::{FixedCodeGenerator, JwtService, ManualClock, RateLimiter};
    use actix_web::body::MessageBody;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::{Value, json};
    use std::sync::Arc;

    fn jwt() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "handler-test-secret".to_string(),
            issuer: None,
            audience: None,
        })
    }

    fn bearer(sub: &str) -> (&'static str, String) {
        let token = jwt().generate_token(sub, 3600).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    const PROXY: &str = "10.1.1.1:443";

    macro_rules! test_app {
        ($max_requests:expr) => {{
            let db = setup_db().await;
            let clock = Arc::new(ManualClock::new());
            let verification_service = VerificationService::new(
                db.clone(),
                Arc::new(RecordingSms::default()),
                Arc::new(FixedCodeGenerator("123456".to_string())),
                clock.clone(),
            );
            let profile_service = ProfileService::new(db.clone());
            let limiter = RateLimiter::new(
                &RateLimitConfig {
                    max_requests: $max_requests,
                    window_secs: 900,
                },
                clock.clone(),
            );
            let form_service = FormService::new(
                db.clone(),
                limiter,
                Arc::new(RecordingMailer::default()),
                clock,
            );
            test::init_service(
                App::new()
                    .wrap(AuthMiddleware::new(jwt()))
                    .app_data(json_config())
                    .app_data(web::Data::new(TrustedProxies(vec![
                        PROXY.parse::<std::net::SocketAddr>().unwrap().ip(),
                    ])))
                    .app_data(web::Data::new(verification_service))
                    .app_data(web::Data::new(profile_service))
                    .app_data(web::Data::new(form_service))
                    .service(
                        web::scope("/api/v1")
                            .configure(verification_config)
                            .configure(forms_config),
                    ),
            )
            .await
        }};
    }

    async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn test_phone_verification_over_http() {
        let app = test_app!(5);

        let req = test::TestRequest::post()
            .uri("/api/v1/send-sms-verification")
            .insert_header(bearer("U1"))
            .set_json(json!({ "phone": "5551234567" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["expires_in"], 600);

        let req = test::TestRequest::post()
            .uri("/api/v1/send-sms-verification")
            .insert_header(bearer("U1"))
            .set_json(json!({ "phone": "5551234567" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let req = test::TestRequest::post()
            .uri("/api/v1/verify-sms-code")
            .insert_header(bearer("U1"))
            .set_json(json!({ "code": "000000" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert!(
            body["error"]["message"]
                .as_str()
                .unwrap()
                .contains("4 attempt(s) remaining")
        );

        let req = test::TestRequest::post()
            .uri("/api/v1/verify-sms-code")
            .insert_header(bearer("U1"))
            .set_json(json!({ "code": "123456" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["success"], true);

        let req = test::TestRequest::get()
            .uri("/api/v1/check-phone-verification")
            .insert_header(bearer("U1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["phone_verified"], true);
        assert_eq!(body["phone"], "5551234567");
        assert_eq!(body["is_new_user"], false);
    }

    #[actix_web::test]
    async fn test_check_for_new_user() {
        let app = test_app!(5);
        let req = test::TestRequest::get()
            .uri("/api/v1/check-phone-verification")
            .insert_header(bearer("brand-new"))
            .to_request();
        let body = json_body(test::call_service(&app, req).await).await;
        assert_eq!(body["is_new_user"], true);
        assert_eq!(body["phone_verified"], false);
        assert!(body["phone"].is_null());
    }

    #[actix_web::test]
    async fn test_protected_routes_require_token() {
        let app = test_app!(5);

        let req = test::TestRequest::post()
            .uri("/api/v1/verify-sms-code")
            .set_json(json!({ "code": "123456" }))
            .to_request();
        let err = app.call(req).await.err().expect("request should be rejected");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::get()
            .uri("/api/v1/check-phone-verification")
            .insert_header(("Authorization", "Bearer not-a-jwt"))
            .to_request();
        let err = app.call(req).await.err().expect("request should be rejected");
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_public_forms_are_rate_limited_by_forwarded_ip() {
        let app = test_app!(1);
        let subscribe = |ip: &'static str, email: &'static str| {
            test::TestRequest::post()
                .uri("/api/v1/newsletter/subscribe")
                .peer_addr(PROXY.parse().unwrap())
                .insert_header(("X-Forwarded-For", ip))
                .set_json(json!({ "email": email }))
                .to_request()
        };

        let resp = test::call_service(&app, subscribe("203.0.113.7", "a@example.com")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, subscribe("203.0.113.7", "b@example.com")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);

        let resp = test::call_service(&app, subscribe("198.51.100.2", "b@example.com")).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_forwarded_ip_ignored_from_untrusted_peer() {
        let app = test_app!(1);
        let subscribe = |ip: &'static str, email: &'static str| {
            test::TestRequest::post()
                .uri("/api/v1/newsletter/subscribe")
                .peer_addr("192.0.2.50:5000".parse().unwrap())
                .insert_header(("X-Forwarded-For", ip))
                .set_json(json!({ "email": email }))
                .to_request()
        };

        let resp = test::call_service(&app, subscribe("203.0.113.7", "a@example.com")).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // rotating the header does not buy a fresh budget
        let resp = test::call_service(&app, subscribe("203.0.113.8", "b@example.com")).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[actix_web::test]
    async fn test_non_string_code_gets_error_envelope() {
        let app = test_app!(5);
        let req = test::TestRequest::post()
            .uri("/api/v1/verify-sms-code")
            .insert_header(bearer("U1"))
            .set_json(json!({ "code": 123456 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid request body");
    }

    #[actix_web::test]
    async fn test_contact_validation_over_http() {
        let app = test_app!(5);
        let req = test::TestRequest::post()
            .uri("/api/v1/contact")
            .set_json(json!({
                "name": "Jane",
                "email": "not-an-email",
                "message": "Hello there, we need a website."
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn test_health_is_public() {
        let app = test_app!(5);
        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }
}
