use crate::entities::{
    contact_submission_entity as contacts, newsletter_subscriber_entity as subscribers,
    privacy_request_entity as privacy,
};
use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutgoingEmail};
use crate::models::*;
use crate::utils::{Clock, RateLimiter, validate_email, validate_length};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr};
use std::sync::Arc;

/// Public site forms: contact, CCPA privacy requests, newsletter sign-up.
#[derive(Clone)]
pub struct FormService {
    pool: DatabaseConnection,
    limiter: RateLimiter,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl FormService {
    pub fn new(
        pool: DatabaseConnection,
        limiter: RateLimiter,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            limiter,
            mailer,
            clock,
        }
    }

    pub async fn submit_contact(
        &self,
        request: ContactRequest,
        ip: &str,
    ) -> AppResult<FormSubmissionResponse> {
        self.limiter.check(&format!("contact:{ip}"))?;

        validate_length("Name", &request.name, 1, 100)?;
        let email = request.email.trim().to_string();
        validate_email(&email)?;
        validate_length("Message", &request.message, 10, 5000)?;

        let saved = contacts::ActiveModel {
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            phone: Set(trimmed(request.phone)),
            company: Set(trimmed(request.company)),
            service: Set(trimmed(request.service)),
            message: Set(request.message.trim().to_string()),
            ip: Set(ip.to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        let mut text = format!(
            "Name: {}\nEmail: {}\n",
            saved.name, saved.email
        );
        if let Some(phone) = &saved.phone {
            text.push_str(&format!("Phone: {phone}\n"));
        }
        if let Some(company) = &saved.company {
            text.push_str(&format!("Company: {company}\n"));
        }
        if let Some(service) = &saved.service {
            text.push_str(&format!("Service: {service}\n"));
        }
        text.push_str(&format!("\n{}\n", saved.message));

        self.notify(OutgoingEmail {
            subject: format!("New contact request from {}", saved.name),
            text,
            reply_to: Some(saved.email.clone()),
        })
        .await;

        Ok(FormSubmissionResponse {
            success: true,
            message: "Thank you for reaching out. We will get back to you soon".to_string(),
        })
    }

    pub async fn submit_privacy_request(
        &self,
        request: PrivacyRequest,
        ip: &str,
    ) -> AppResult<FormSubmissionResponse> {
        self.limiter.check(&format!("ccpa:{ip}"))?;

        validate_length("Name", &request.name, 1, 100)?;
        let email = request.email.trim().to_string();
        validate_email(&email)?;
        let details = trimmed(request.details);
        if let Some(details) = &details {
            validate_length("Details", details, 1, 5000)?;
        }

        let saved = privacy::ActiveModel {
            name: Set(request.name.trim().to_string()),
            email: Set(email),
            request_type: Set(request.request_type),
            details: Set(details),
            ip: Set(ip.to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Privacy request #{} received ({})",
            saved.id,
            saved.request_type
        );

        self.notify(OutgoingEmail {
            subject: format!("CCPA {} request #{}", saved.request_type, saved.id),
            text: format!(
                "Name: {}\nEmail: {}\nType: {}\n\n{}\n",
                saved.name,
                saved.email,
                saved.request_type,
                saved.details.as_deref().unwrap_or("(no details)")
            ),
            reply_to: Some(saved.email.clone()),
        })
        .await;

        Ok(FormSubmissionResponse {
            success: true,
            message: "Your privacy request has been received".to_string(),
        })
    }

    /// Idempotent: re-subscribing an address reports `already_subscribed`.
    pub async fn subscribe_newsletter(
        &self,
        request: NewsletterSubscribeRequest,
        ip: &str,
    ) -> AppResult<NewsletterSubscribeResponse> {
        self.limiter.check(&format!("newsletter:{ip}"))?;

        let email = request.email.trim().to_lowercase();
        validate_email(&email)?;

        let existing = subscribers::Entity::find()
            .filter(subscribers::Column::Email.eq(email.as_str()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Ok(already_subscribed());
        }

        let inserted = subscribers::ActiveModel {
            email: Set(email),
            ip: Set(ip.to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(NewsletterSubscribeResponse {
                success: true,
                message: "Thanks for subscribing".to_string(),
                already_subscribed: false,
            }),
            // concurrent subscribe of the same address
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Ok(already_subscribed())
            }
            Err(e) => Err(AppError::from(e)),
        }
    }

    /// Best effort: failures are logged, never surfaced to the submitter.
    async fn notify(&self, email: OutgoingEmail) {
        if !self.mailer.is_enabled() {
            log::debug!("Mailer disabled; skipping notification '{}'", email.subject);
            return;
        }
        if let Err(e) = self.mailer.send(&email).await {
            log::error!("Failed to send notification '{}': {e}", email.subject);
        }
    }
}

fn already_subscribed() -> NewsletterSubscribeResponse {
    NewsletterSubscribeResponse {
        success: true,
        message: "You are already subscribed".to_string(),
        already_subscribed: true,
    }
}
