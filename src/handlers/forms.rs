use crate::models::*;
use crate::services::FormService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use std::net::IpAddr;

/// Reverse proxies whose forwarding headers are believed.
#[derive(Debug, Clone, Default)]
pub struct TrustedProxies(pub Vec<IpAddr>);

/// Client address used as the rate-limit key.
///
/// `Forwarded` / `X-Forwarded-For` are only honoured when the socket peer is a
/// configured proxy.
fn client_ip(req: &HttpRequest) -> String {
    let peer = req.peer_addr().map(|addr| addr.ip());
    let via_trusted_proxy = match (req.app_data::<web::Data<TrustedProxies>>(), peer) {
        (Some(trusted), Some(ip)) => trusted.0.contains(&ip),
        _ => false,
    };

    if via_trusted_proxy && let Some(ip) = req.connection_info().realip_remote_addr() {
        return ip.to_string();
    }
    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[utoipa::path(
    post,
    path = "/contact",
    tag = "forms",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Contact request received", body = FormSubmissionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    )
)]
pub async fn submit_contact(
    form_service: web::Data<FormService>,
    req: HttpRequest,
    request: web::Json<ContactRequest>,
) -> Result<HttpResponse> {
    let ip = client_ip(&req);
    match form_service.submit_contact(request.into_inner(), &ip).await {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/ccpa-request",
    tag = "forms",
    request_body = PrivacyRequest,
    responses(
        (status = 200, description = "Privacy request received", body = FormSubmissionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    )
)]
pub async fn submit_privacy_request(
    form_service: web::Data<FormService>,
    req: HttpRequest,
    request: web::Json<PrivacyRequest>,
) -> Result<HttpResponse> {
    let ip = client_ip(&req);
    match form_service
        .submit_privacy_request(request.into_inner(), &ip)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/newsletter/subscribe",
    tag = "forms",
    request_body = NewsletterSubscribeRequest,
    responses(
        (status = 200, description = "Subscribed", body = NewsletterSubscribeResponse),
        (status = 400, description = "Invalid email", body = ErrorResponse),
        (status = 429, description = "Rate limited", body = ErrorResponse)
    )
)]
pub async fn subscribe_newsletter(
    form_service: web::Data<FormService>,
    req: HttpRequest,
    request: web::Json<NewsletterSubscribeRequest>,
) -> Result<HttpResponse> {
    let ip = client_ip(&req);
    match form_service
        .subscribe_newsletter(request.into_inner(), &ip)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "ok".to_string(),
    }))
}

pub fn forms_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/contact", web::post().to(submit_contact))
        .route("/ccpa-request", web::post().to(submit_privacy_request))
        .route("/newsletter/subscribe", web::post().to(subscribe_newsletter));
}
