// src/db/member_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::members::{Member, MemberStatus},
};

// Todas as consultas de alunos rodam DENTRO de uma transação com escopo de
// tenant (RLS aplicado); por isso o repositório não guarda pool própria e
// recebe sempre o executor do chamador.
#[derive(Clone)]
pub struct MemberRepository;

impl MemberRepository {
    pub fn new() -> Self {
        Self
    }

    /// A checagem de identidade do cadastro.
    ///
    /// Regra não-óbvia e deliberada: a consulta INCLUI alunos excluídos
    /// (soft delete) — a identidade deles continua reservada — e EXCLUI
    /// alunos arquivados, que liberam e-mail/telefone/nome para reuso.
    /// Devolve o nome do campo em conflito, para a mensagem de erro.
    pub async fn find_identity_conflict<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Option<&'static str>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (email_taken, phone_taken, name_taken) =
            sqlx::query_as::<_, (bool, bool, bool)>(
                r#"
                SELECT
                    EXISTS (
                        SELECT 1 FROM members
                        WHERE org_id = $1 AND status <> 'archived'
                          AND $3::text IS NOT NULL AND lower(email) = lower($3)
                    ),
                    EXISTS (
                        SELECT 1 FROM members
                        WHERE org_id = $1 AND status <> 'archived'
                          AND $4::text IS NOT NULL AND phone = $4
                    ),
                    EXISTS (
                        SELECT 1 FROM members
                        WHERE org_id = $1 AND status <> 'archived'
                          AND lower(full_name) = lower($2)
                    )
                "#,
            )
            .bind(org_id)
            .bind(full_name)
            .bind(email)
            .bind(phone)
            .fetch_one(executor)
            .await?;

        if email_taken {
            return Ok(Some("e-mail"));
        }
        if phone_taken {
            return Ok(Some("telefone"));
        }
        if name_taken {
            return Ok(Some("nome"));
        }
        Ok(None)
    }

    pub async fn insert_member<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        full_name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        birth_date: Option<NaiveDate>,
    ) -> Result<Member, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (org_id, full_name, email, phone, birth_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(birth_date)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // A pré-checagem dá a mensagem boa; os índices parciais são a
            // garantia de verdade contra duas inserções concorrentes.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("idx_members_email_reserved") => {
                            AppError::IdentityInUse("e-mail".to_string())
                        }
                        Some("idx_members_phone_reserved") => {
                            AppError::IdentityInUse("telefone".to_string())
                        }
                        Some("idx_members_full_name_reserved") => {
                            AppError::IdentityInUse("nome".to_string())
                        }
                        Some(constraint) => {
                            AppError::UniqueConstraintViolation(constraint.to_string())
                        }
                        None => AppError::UniqueConstraintViolation(
                            "Identidade já cadastrada.".to_string(),
                        ),
                    };
                }
            }
            e.into()
        })
    }

    /// Lista só os alunos ativos (excluídos e arquivados ficam de fora).
    pub async fn list_members<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
    ) -> Result<Vec<Member>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let members = sqlx::query_as::<_, Member>(
            r#"
            SELECT * FROM members
            WHERE org_id = $1 AND status = 'active'
            ORDER BY full_name
            "#,
        )
        .bind(org_id)
        .fetch_all(executor)
        .await?;

        Ok(members)
    }

    pub async fn find_member<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        member_id: Uuid,
    ) -> Result<Option<Member>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE id = $1 AND org_id = $2 AND status = 'active'",
        )
        .bind(member_id)
        .bind(org_id)
        .fetch_optional(executor)
        .await?;

        Ok(maybe)
    }

    /// Transição de status (active -> deleted, active -> archived).
    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        member_id: Uuid,
        status: MemberStatus,
    ) -> Result<Option<Member>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, Member>(
            r#"
            UPDATE members
            SET status = $3
            WHERE id = $1 AND org_id = $2
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(org_id)
        .bind(status)
        .fetch_optional(executor)
        .await?;

        Ok(maybe)
    }
}
