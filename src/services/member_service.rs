// src/services/member_service.rs

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MemberRepository,
    models::members::{Member, MemberStatus, RegisterMemberPayload},
};

// As mutações de aluno recebem a transação JÁ escopada (RLS aplicado pelo
// begin_scoped_tx do chamador): este serviço cuida só das regras.
#[derive(Clone)]
pub struct MemberService {
    member_repo: MemberRepository,
}

impl MemberService {
    pub fn new(member_repo: MemberRepository) -> Self {
        Self { member_repo }
    }

    /// Cadastra um aluno aplicando a política de reserva de identidade:
    /// aluno excluído ainda bloqueia e-mail/telefone/nome; arquivado libera.
    /// A pré-checagem produz a mensagem amigável; os índices parciais do
    /// banco seguram o caso de dois cadastros simultâneos.
    pub async fn register_member(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        payload: &RegisterMemberPayload,
    ) -> Result<Member, AppError> {
        if let Some(field) = self
            .member_repo
            .find_identity_conflict(
                &mut **tx,
                org_id,
                &payload.full_name,
                payload.email.as_deref(),
                payload.phone.as_deref(),
            )
            .await?
        {
            return Err(AppError::IdentityInUse(field.to_string()));
        }

        self.member_repo
            .insert_member(
                &mut **tx,
                org_id,
                &payload.full_name,
                payload.email.as_deref(),
                payload.phone.as_deref(),
                payload.birth_date,
            )
            .await
    }

    /// Exclusão (soft delete): o aluno some das listagens, mas a identidade
    /// dele continua reservada.
    pub async fn remove_member(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        member_id: Uuid,
    ) -> Result<Member, AppError> {
        self.member_repo
            .set_status(&mut **tx, org_id, member_id, MemberStatus::Deleted)
            .await?
            .ok_or(AppError::MemberNotFound)
    }

    /// Arquivamento: libera e-mail/telefone/nome para um novo cadastro.
    pub async fn archive_member(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        org_id: Uuid,
        member_id: Uuid,
    ) -> Result<Member, AppError> {
        self.member_repo
            .set_status(&mut **tx, org_id, member_id, MemberStatus::Archived)
            .await?
            .ok_or(AppError::MemberNotFound)
    }
}
