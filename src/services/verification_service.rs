//! SMS one-time passcode flow.
//!
//! A code record is `pending` while unverified and unexpired. It becomes
//! `consumed` (verified = true) when it is matched or when a sibling code of the
//! same owner is matched, and `dead` once its expiry passes. No record ever
//! returns to `pending`; a new send overwrites the `(owner, phone)` record.

use crate::entities::verification_code_entity as codes;
use crate::error::{AppError, AppResult};
use crate::external::SmsSender;
use crate::models::{SendSmsVerificationResponse, VerifySmsCodeResponse};
use crate::services::ProfileService;
use crate::utils::{Clock, CodeGenerator, is_six_digit_code, mask_phone, normalize_phone_number, to_e164};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::sync::Arc;

pub const CODE_TTL_MINUTES: i64 = 10;
pub const MAX_ATTEMPTS: i32 = 5;

#[derive(Clone)]
pub struct VerificationService {
    pool: DatabaseConnection,
    sms: Arc<dyn SmsSender>,
    codes: Arc<dyn CodeGenerator>,
    clock: Arc<dyn Clock>,
}

impl VerificationService {
    pub fn new(
        pool: DatabaseConnection,
        sms: Arc<dyn SmsSender>,
        codes: Arc<dyn CodeGenerator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pool,
            sms,
            codes,
            clock,
        }
    }

    /// Issue a fresh code for `phone` and text it to the caller.
    ///
    /// Steps run in order: persist code, send SMS, update profile. A failed send
    /// removes the code it just persisted.
    pub async fn send_code(
        &self,
        owner: &str,
        phone: &str,
    ) -> AppResult<SendSmsVerificationResponse> {
        let phone = normalize_phone_number(phone)?;
        let now = self.clock.now();

        if let Some(profile) = ProfileService::find(&self.pool, owner).await?
            && profile.phone_verified
            && profile.phone.as_deref() == Some(phone.as_str())
        {
            return Err(AppError::ValidationError(
                "This phone number is already verified".to_string(),
            ));
        }

        let existing = codes::Entity::find()
            .filter(codes::Column::Owner.eq(owner))
            .filter(codes::Column::Phone.eq(phone.as_str()))
            .one(&self.pool)
            .await?;

        if let Some(existing) = existing
            && !existing.verified
            && !existing.is_expired_at(now)
        {
            let minutes = remaining_minutes(existing.expires_at, now);
            return Err(AppError::TooManyRequests(format!(
                "A verification code was already sent. Please wait {minutes} minute(s) before requesting a new one"
            )));
        }

        let code = self.codes.generate();
        let expires_at = now + Duration::minutes(CODE_TTL_MINUTES);
        self.store_code(owner, &phone, &code, expires_at, now).await?;

        let body = format!(
            "Your DOBEU verification code is: {code}. It expires in {CODE_TTL_MINUTES} minutes."
        );
        if let Err(e) = self.sms.send_sms(&to_e164(&phone), &body).await {
            log::error!("Failed to send verification SMS to {}: {e}", mask_phone(&phone));
            self.discard_code(owner, &phone, &code).await;
            return Err(AppError::ExternalApiError(format!(
                "Failed to send verification code: {e}"
            )));
        }

        ProfileService::set_pending_phone(&self.pool, owner, &phone, now).await?;

        log::info!("Verification code issued for {}", mask_phone(&phone));
        Ok(SendSmsVerificationResponse {
            success: true,
            message: "Verification code sent".to_string(),
            expires_in: CODE_TTL_MINUTES * 60,
        })
    }

    /// Check `code` against the caller's newest live code.
    pub async fn verify_code(&self, owner: &str, code: &str) -> AppResult<VerifySmsCodeResponse> {
        if !is_six_digit_code(code) {
            return Err(AppError::ValidationError(
                "Verification code must be exactly 6 digits".to_string(),
            ));
        }

        let now = self.clock.now();
        let record = codes::Entity::find()
            .filter(codes::Column::Owner.eq(owner))
            .filter(codes::Column::Verified.eq(false))
            .filter(codes::Column::ExpiresAt.gt(now))
            .order_by_desc(codes::Column::CreatedAt)
            .order_by_desc(codes::Column::Id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| {
                AppError::ValidationError(
                    "No valid verification code found. Please request a new code".to_string(),
                )
            })?;

        if record.is_expired_at(now) {
            return Err(AppError::ValidationError(
                "Verification code has expired. Please request a new code".to_string(),
            ));
        }

        if record.attempts >= MAX_ATTEMPTS {
            return Err(too_many_attempts());
        }

        if record.code != code {
            let attempts = self.record_failed_attempt(&record).await?;
            let remaining = (MAX_ATTEMPTS - attempts).max(0);
            return Err(AppError::ValidationError(format!(
                "Invalid verification code. {remaining} attempt(s) remaining"
            )));
        }

        let invalidated = self.consume_code(owner, &record, now).await?;

        log::info!(
            "Phone {} verified; {} sibling code(s) invalidated",
            mask_phone(&record.phone),
            invalidated
        );
        Ok(VerifySmsCodeResponse {
            success: true,
            message: "Phone number verified successfully".to_string(),
        })
    }

    /// Delete codes that expired before `older_than`. Returns how many went.
    pub async fn purge_expired_codes(&self, older_than: Duration) -> AppResult<u64> {
        let cutoff = self.clock.now() - older_than;
        let res = codes::Entity::delete_many()
            .filter(codes::Column::ExpiresAt.lt(cutoff))
            .exec(&self.pool)
            .await?;
        Ok(res.rows_affected)
    }

    async fn store_code(
        &self,
        owner: &str,
        phone: &str,
        code: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let am = codes::ActiveModel {
            owner: Set(owner.to_string()),
            phone: Set(phone.to_string()),
            code: Set(code.to_string()),
            expires_at: Set(expires_at),
            verified: Set(false),
            attempts: Set(0),
            created_at: Set(now),
            ..Default::default()
        };

        codes::Entity::insert(am)
            .on_conflict(
                OnConflict::columns([codes::Column::Owner, codes::Column::Phone])
                    .update_columns([
                        codes::Column::Code,
                        codes::Column::ExpiresAt,
                        codes::Column::Verified,
                        codes::Column::Attempts,
                        codes::Column::CreatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.pool)
            .await?;
        Ok(())
    }

    /// Undo `store_code` after a failed send. Only removes the exact unverified
    /// code written, so repeating it or racing a newer send is harmless.
    async fn discard_code(&self, owner: &str, phone: &str, code: &str) {
        let res = codes::Entity::delete_many()
            .filter(codes::Column::Owner.eq(owner))
            .filter(codes::Column::Phone.eq(phone))
            .filter(codes::Column::Code.eq(code))
            .filter(codes::Column::Verified.eq(false))
            .exec(&self.pool)
            .await;
        if let Err(e) = res {
            log::error!(
                "Failed to discard unsent verification code for {}: {e}",
                mask_phone(phone)
            );
        }
    }

    /// Mark `record` verified, verify the owner's profile and retire every other
    /// outstanding code, all in one transaction. Returns the sibling count.
    async fn consume_code(
        &self,
        owner: &str,
        record: &codes::Model,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let txn = self.pool.begin().await?;

        let consumed = codes::Entity::update_many()
            .col_expr(codes::Column::Verified, Expr::value(true))
            .filter(codes::Column::Id.eq(record.id))
            .filter(codes::Column::Verified.eq(false))
            .exec(&txn)
            .await?;
        if consumed.rows_affected == 0 {
            // lost a race with a concurrent verify
            txn.rollback().await?;
            return Err(AppError::ValidationError(
                "No valid verification code found. Please request a new code".to_string(),
            ));
        }

        ProfileService::mark_phone_verified(&txn, owner, &record.phone, now).await?;

        // retire every other outstanding code so none can be replayed later
        let invalidated = codes::Entity::update_many()
            .col_expr(codes::Column::Verified, Expr::value(true))
            .filter(codes::Column::Owner.eq(owner))
            .filter(codes::Column::Verified.eq(false))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(invalidated.rows_affected)
    }

    /// Bump the attempt counter in the database. Returns the new count, or 429
    /// when the ceiling was already reached by a concurrent request.
    async fn record_failed_attempt(&self, record: &codes::Model) -> AppResult<i32> {
        let res = codes::Entity::update_many()
            .col_expr(
                codes::Column::Attempts,
                Expr::col(codes::Column::Attempts).add(1),
            )
            .filter(codes::Column::Id.eq(record.id))
            .filter(codes::Column::Attempts.lt(MAX_ATTEMPTS))
            .exec(&self.pool)
            .await?;
        if res.rows_affected == 0 {
            return Err(too_many_attempts());
        }

        let updated = codes::Entity::find_by_id(record.id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Verification code no longer exists".to_string()))?;
        Ok(updated.attempts)
    }
}

fn too_many_attempts() -> AppError {
    AppError::TooManyRequests("Too many failed attempts. Please request a new code".to_string())
}

/// Whole minutes until `expires_at`, rounded up.
fn remaining_minutes(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let ms = (expires_at - now).num_milliseconds().max(0);
    (ms + 59_999) / 60_000
}
