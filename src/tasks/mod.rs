//! Background maintenance jobs.
//!
//! Call `spawn_all` once during startup; the tasks are detached and loop for the
//! lifetime of the process.

use crate::services::VerificationService;
use crate::utils::RateLimiter;
use std::time::Duration;

/// Dead codes are kept this long past expiry before they are deleted.
const CODE_RETENTION_MINUTES: i64 = 60;

/// One maintenance pass: drop long-dead verification codes and finished
/// rate-limit windows.
pub async fn run_maintenance(verification_service: &VerificationService, limiter: &RateLimiter) {
    match verification_service
        .purge_expired_codes(chrono::Duration::minutes(CODE_RETENTION_MINUTES))
        .await
    {
        Ok(n) if n > 0 => log::info!("Expired verification codes purged: {n}"),
        Ok(_) => {}
        Err(e) => log::error!("Failed to purge expired verification codes: {e:?}"),
    }

    let purged = limiter.purge_expired();
    if purged > 0 {
        log::debug!("Rate limit windows purged: {purged}");
    }
}

pub fn spawn_all(verification_service: VerificationService, limiter: RateLimiter, interval_secs: u64) {
    tokio::spawn(async move {
        loop {
            run_maintenance(&verification_service, &limiter).await;
            tokio::time::sleep(Duration::from_secs(interval_secs.max(1))).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::entities::verification_code_entity as codes;
    use crate::test_support::{RecordingSms, setup_db};
    use crate::utils::{FixedCodeGenerator, ManualClock};
    use sea_orm::{EntityTrait, PaginatorTrait};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_maintenance_purges_codes_and_windows() {
        let db = setup_db().await;
        let clock = Arc::new(ManualClock::new());
        let service = VerificationService::new(
            db.clone(),
            Arc::new(RecordingSms::default()),
            Arc::new(FixedCodeGenerator("123456".to_string())),
            clock.clone(),
        );
        let limiter = RateLimiter::new(
            &RateLimitConfig {
                max_requests: 5,
                window_secs: 60,
            },
            clock.clone(),
        );

        service.send_code("U1", "5551234567").await.unwrap();
        limiter.check("10.0.0.1").unwrap();

        run_maintenance(&service, &limiter).await;
        assert_eq!(codes::Entity::find().count(&db).await.unwrap(), 1);
        assert_eq!(limiter.tracked_keys(), 1);

        // 10 minute expiry + 60 minute retention
        clock.advance(Duration::from_secs(71 * 60));
        run_maintenance(&service, &limiter).await;
        assert_eq!(codes::Entity::find().count(&db).await.unwrap(), 0);
        assert_eq!(limiter.tracked_keys(), 0);
    }
}
