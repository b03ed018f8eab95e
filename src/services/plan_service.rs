// src/services/plan_service.rs

use chrono::{Days, NaiveDate};
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{MemberRepository, PlanRepository},
    models::plans::{CreatePlanPayload, MemberPass, MembershipPlan, SellPassPayload},
};

#[derive(Clone)]
pub struct PlanService {
    plan_repo: PlanRepository,
    member_repo: MemberRepository,
}

impl PlanService {
    pub fn new(plan_repo: PlanRepository, member_repo: MemberRepository) -> Self {
        Self {
            plan_repo,
            member_repo,
        }
    }

    pub async fn create_plan(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        payload: &CreatePlanPayload,
    ) -> Result<MembershipPlan, AppError> {
        self.plan_repo
            .create_plan(
                &mut **tx,
                org_id,
                &payload.name,
                payload.price,
                payload.duration_days,
            )
            .await
    }

    /// Vende um passe: o aluno e o plano precisam existir (e estar ativos)
    /// na academia; a vigência sai da duração do plano.
    pub async fn sell_pass(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        payload: &SellPassPayload,
    ) -> Result<MemberPass, AppError> {
        let member = self
            .member_repo
            .find_member(&mut **tx, org_id, payload.member_id)
            .await?
            .ok_or(AppError::MemberNotFound)?;

        let plan = self
            .plan_repo
            .find_plan(&mut **tx, org_id, payload.plan_id)
            .await?
            .ok_or(AppError::PlanNotFound)?;

        let expires_on = pass_expiry(payload.starts_on, plan.duration_days);

        self.plan_repo
            .create_pass(
                &mut **tx,
                org_id,
                member.id,
                plan.id,
                payload.starts_on,
                expires_on,
            )
            .await
    }
}

/// Data de expiração de um passe: início + duração do plano.
fn pass_expiry(starts_on: NaiveDate, duration_days: i32) -> NaiveDate {
    starts_on
        .checked_add_days(Days::new(duration_days.max(0) as u64))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passe_expira_no_fim_da_duracao_do_plano() {
        let inicio = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(
            pass_expiry(inicio, 30),
            NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()
        );
    }

    #[test]
    fn duracao_negativa_nao_volta_no_tempo() {
        let inicio = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(pass_expiry(inicio, -5), inicio);
    }
}
