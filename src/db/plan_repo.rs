// src/db/plan_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::plans::{MemberPass, MembershipPlan},
};

// Mesmo regime do repositório de alunos: toda consulta roda dentro de uma
// transação com escopo de tenant, então o executor vem sempre do chamador.
#[derive(Clone)]
pub struct PlanRepository;

impl PlanRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn create_plan<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        name: &str,
        price: Decimal,
        duration_days: i32,
    ) -> Result<MembershipPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MembershipPlan>(
            r#"
            INSERT INTO membership_plans (org_id, name, price, duration_days)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(name)
        .bind(price)
        .bind(duration_days)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um plano com esse nome.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_plans<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
    ) -> Result<Vec<MembershipPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plans = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans WHERE org_id = $1 AND is_active ORDER BY name",
        )
        .bind(org_id)
        .fetch_all(executor)
        .await?;

        Ok(plans)
    }

    pub async fn find_plan<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        plan_id: Uuid,
    ) -> Result<Option<MembershipPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, MembershipPlan>(
            "SELECT * FROM membership_plans WHERE id = $1 AND org_id = $2 AND is_active",
        )
        .bind(plan_id)
        .bind(org_id)
        .fetch_optional(executor)
        .await?;

        Ok(maybe)
    }

    pub async fn create_pass<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        member_id: Uuid,
        plan_id: Uuid,
        starts_on: NaiveDate,
        expires_on: NaiveDate,
    ) -> Result<MemberPass, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MemberPass>(
            r#"
            INSERT INTO member_passes (org_id, member_id, plan_id, starts_on, expires_on)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(member_id)
        .bind(plan_id)
        .bind(starts_on)
        .bind(expires_on)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn list_passes_for_member<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        member_id: Uuid,
    ) -> Result<Vec<MemberPass>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let passes = sqlx::query_as::<_, MemberPass>(
            r#"
            SELECT * FROM member_passes
            WHERE org_id = $1 AND member_id = $2
            ORDER BY starts_on DESC
            "#,
        )
        .bind(org_id)
        .bind(member_id)
        .fetch_all(executor)
        .await?;

        Ok(passes)
    }
}
