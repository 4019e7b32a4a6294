//! Shared fixtures for unit tests: an in-memory database migrated with the
//! real migrator, and recording fakes for the outbound gateways.

use crate::error::{AppError, AppResult};
use crate::external::{Mailer, OutgoingEmail, SmsSender};
use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
    // every pooled connection would otherwise get its own empty database
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

#[derive(Default)]
pub struct RecordingSms {
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail: AtomicBool,
}

impl RecordingSms {
    pub fn failing() -> Self {
        let sms = Self::default();
        sms.fail.store(true, Ordering::SeqCst);
        sms
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl SmsSender for RecordingSms {
    async fn send_sms(&self, to: &str, body: &str) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApiError("carrier unavailable".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub fail: AtomicBool,
}

#[async_trait]
impl Mailer for RecordingMailer {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn send(&self, email: &OutgoingEmail) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApiError("mail provider down".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
