use crate::entities::profile_entity as profiles;
use crate::error::{AppError, AppResult};
use crate::models::PhoneVerificationStatus;
use crate::utils::{RetryPolicy, with_retry};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set};

#[derive(Clone)]
pub struct ProfileService {
    pool: DatabaseConnection,
    retry: RetryPolicy,
}

impl ProfileService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self {
            pool,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn find<C: ConnectionTrait>(db: &C, owner: &str) -> AppResult<Option<profiles::Model>> {
        Ok(profiles::Entity::find_by_id(owner.to_string()).one(db).await?)
    }

    /// Record `phone` as the owner's pending, unverified number.
    pub async fn set_pending_phone<C: ConnectionTrait>(
        db: &C,
        owner: &str,
        phone: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        Self::upsert_phone(db, owner, phone, false, None, now).await
    }

    pub async fn mark_phone_verified<C: ConnectionTrait>(
        db: &C,
        owner: &str,
        phone: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        Self::upsert_phone(db, owner, phone, true, Some(now), now).await
    }

    async fn upsert_phone<C: ConnectionTrait>(
        db: &C,
        owner: &str,
        phone: &str,
        verified: bool,
        verified_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let am = profiles::ActiveModel {
            owner: Set(owner.to_string()),
            phone: Set(Some(phone.to_string())),
            phone_verified: Set(verified),
            phone_verified_at: Set(verified_at),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // created_at is left alone on conflict
        profiles::Entity::insert(am)
            .on_conflict(
                OnConflict::column(profiles::Column::Owner)
                    .update_columns([
                        profiles::Column::Phone,
                        profiles::Column::PhoneVerified,
                        profiles::Column::PhoneVerifiedAt,
                        profiles::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
        Ok(())
    }

    /// Phone verification state for the caller; a missing profile means a new user.
    pub async fn phone_status(&self, owner: &str) -> AppResult<PhoneVerificationStatus> {
        let profile = with_retry(self.retry, || {
            let owner = owner.to_string();
            let pool = &self.pool;
            async move {
                profiles::Entity::find_by_id(owner)
                    .one(pool)
                    .await
                    .map_err(AppError::from)
            }
        })
        .await?;

        Ok(match profile {
            Some(p) => PhoneVerificationStatus {
                phone_verified: p.phone_verified,
                phone: p.phone,
                is_new_user: false,
            },
            None => PhoneVerificationStatus {
                phone_verified: false,
                phone: None,
                is_new_user: true,
            },
        })
    }
}
