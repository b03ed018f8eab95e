// src/models/plans.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Plano de matrícula da academia (Mensal, Trimestral, etc.)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MembershipPlan {
    pub id: Uuid,

    #[schema(ignore)]
    pub org_id: Uuid,

    #[schema(example = "Mensal Musculação")]
    pub name: String,

    #[schema(example = "129.90")]
    pub price: Decimal,

    #[schema(example = 30)]
    pub duration_days: i32,

    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Passe do aluno: a vigência de um plano para um aluno
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MemberPass {
    pub id: Uuid,

    #[schema(ignore)]
    pub org_id: Uuid,

    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub starts_on: NaiveDate,
    pub expires_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanPayload {
    #[validate(length(min = 2, message = "O nome do plano deve ter no mínimo 2 caracteres."))]
    pub name: String,

    pub price: Decimal,

    #[validate(range(min = 1, message = "A duração deve ser de pelo menos 1 dia."))]
    pub duration_days: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellPassPayload {
    pub member_id: Uuid,
    pub plan_id: Uuid,
    pub starts_on: NaiveDate,
}
