// src/db/org_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenancy::{Organization, OrgMembership, OrgUser},
};

#[derive(Clone)]
pub struct OrgRepository {
    pool: PgPool,
}

impl OrgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria uma nova academia.
    pub async fn create_organization<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, description)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    /// Cria o vínculo de um usuário dentro de uma academia.
    pub async fn create_org_user<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        user_id: Uuid,
        is_foh_user: bool,
    ) -> Result<OrgUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, OrgUser>(
            r#"
            INSERT INTO org_users (org_id, user_id, is_foh_user)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(user_id)
        .bind(is_foh_user)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Este usuário já faz parte desta academia.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    /// Resolve o vínculo ATUAL da sessão, do jeito paranoico certo: o id do
    /// vínculo tem que pertencer ao usuário, estar operacional e a academia
    /// não pode estar excluída. Ponteiro obsoleto/forjado => None.
    pub async fn find_operational_org_user(
        &self,
        org_user_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<OrgUser>, AppError> {
        let maybe = sqlx::query_as::<_, OrgUser>(
            r#"
            SELECT ou.*
            FROM org_users ou
            JOIN organizations o ON o.id = ou.org_id AND o.deleted_at IS NULL
            WHERE ou.id = $1
              AND ou.user_id = $2
              AND ou.is_active
              AND NOT ou.is_archived
              AND ou.deleted_at IS NULL
            "#,
        )
        .bind(org_user_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe)
    }

    /// Uma linha por academia do usuário, para os portões de acesso.
    /// Vínculos excluídos (soft delete) e academias excluídas ficam de fora;
    /// is_active/is_archived vão como dado, a decisão é do chamador.
    pub async fn list_memberships(&self, user_id: Uuid) -> Result<Vec<OrgMembership>, AppError> {
        let memberships = sqlx::query_as::<_, OrgMembership>(
            r#"
            SELECT
                ou.id AS org_user_id,
                ou.org_id,
                o.name AS org_name,
                ou.is_foh_user,
                ou.is_active,
                ou.is_archived
            FROM org_users ou
            JOIN organizations o ON o.id = ou.org_id AND o.deleted_at IS NULL
            WHERE ou.user_id = $1
              AND ou.deleted_at IS NULL
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(memberships)
    }

    /// As academias em que o usuário tem vínculo operacional.
    pub async fn list_user_organizations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Organization>, AppError> {
        let orgs = sqlx::query_as::<_, Organization>(
            r#"
            SELECT o.*
            FROM organizations o
            JOIN org_users ou ON ou.org_id = o.id
            WHERE ou.user_id = $1
              AND ou.is_active
              AND NOT ou.is_archived
              AND ou.deleted_at IS NULL
              AND o.deleted_at IS NULL
            ORDER BY o.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(orgs)
    }

    /// O vínculo do usuário em UMA academia específica (para a troca de
    /// academia atual).
    pub async fn find_membership_for_org(
        &self,
        user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<OrgUser>, AppError> {
        let maybe = sqlx::query_as::<_, OrgUser>(
            r#"
            SELECT ou.*
            FROM org_users ou
            JOIN organizations o ON o.id = ou.org_id AND o.deleted_at IS NULL
            WHERE ou.user_id = $1
              AND ou.org_id = $2
              AND ou.is_active
              AND NOT ou.is_archived
              AND ou.deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe)
    }

    /// Um vínculo qualquer DENTRO da academia (alvo de atribuição de cargo).
    /// O org_id é obrigatório: nunca devolvemos vínculo de outra academia.
    pub async fn find_org_user_in_org(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Option<OrgUser>, AppError> {
        let maybe = sqlx::query_as::<_, OrgUser>(
            r#"
            SELECT *
            FROM org_users
            WHERE id = $1
              AND org_id = $2
              AND is_active
              AND NOT is_archived
              AND deleted_at IS NULL
            "#,
        )
        .bind(org_user_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe)
    }
}
