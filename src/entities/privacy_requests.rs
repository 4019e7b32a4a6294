use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "privacy_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub email: String,
    pub request_type: PrivacyRequestType,
    #[sea_orm(column_type = "Text", nullable)]
    pub details: Option<String>,
    pub ip: String,
    pub created_at: DateTime<Utc>,
}

/// CCPA consumer request kinds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
#[serde(rename_all = "snake_case")]
pub enum PrivacyRequestType {
    #[sea_orm(string_value = "access")]
    Access,
    #[sea_orm(string_value = "delete")]
    Delete,
    #[sea_orm(string_value = "opt_out")]
    OptOut,
    #[sea_orm(string_value = "correct")]
    Correct,
}

impl std::fmt::Display for PrivacyRequestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrivacyRequestType::Access => write!(f, "access"),
            PrivacyRequestType::Delete => write!(f, "delete"),
            PrivacyRequestType::OptOut => write!(f, "opt_out"),
            PrivacyRequestType::Correct => write!(f, "correct"),
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
