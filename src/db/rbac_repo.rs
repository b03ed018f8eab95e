// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::rbac::{Module, Role, RoleTask, RoleUser, Task, TaskCategory},
};

/// O cargo ativo que um vínculo já possui num módulo (para a checagem de
/// conflito devolver um erro que NOMEIA o cargo existente).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ActiveRoleAssignment {
    pub role_id: Uuid,
    pub role_name: String,
}

/// Quem ocupa um cargo hoje (para a tela de gestão de equipe).
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleHolder {
    pub org_user_id: Uuid,
    pub full_name: String,
    pub email: String,
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CARGOS
    // =========================================================================

    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        module: Module,
        name: &str,
        slug: &str,
        description: Option<&str>,
        is_protected: bool,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (org_id, module, name, slug, description, is_protected)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(module)
        .bind(name)
        .bind(slug)
        .bind(description)
        .bind(is_protected)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um cargo com esse nome neste módulo.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn find_role(&self, org_id: Uuid, role_id: Uuid) -> Result<Option<Role>, AppError> {
        let maybe = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE id = $1 AND org_id = $2 AND is_active",
        )
        .bind(role_id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe)
    }

    /// Cargos ativos da academia num módulo (o caso normal).
    pub async fn list_roles(&self, org_id: Uuid, module: Module) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE org_id = $1 AND module = $2 AND is_active ORDER BY name",
        )
        .bind(org_id)
        .bind(module)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    /// Variante para telas administrativas de recuperação: inclui cargos
    /// desativados.
    pub async fn list_roles_including_inactive(
        &self,
        org_id: Uuid,
        module: Module,
    ) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE org_id = $1 AND module = $2 ORDER BY name",
        )
        .bind(org_id)
        .bind(module)
        .fetch_all(&self.pool)
        .await?;

        Ok(roles)
    }

    // =========================================================================
    //  TAREFAS (catálogo por módulo)
    // =========================================================================

    pub async fn find_tasks_by_slugs<'e, E>(
        &self,
        executor: E,
        module: Module,
        slugs: &[String],
    ) -> Result<Vec<Task>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // O SQLx lida bem com arrays usando ANY
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE module = $1 AND slug = ANY($2)",
        )
        .bind(module)
        .bind(slugs)
        .fetch_all(executor)
        .await?;

        Ok(tasks)
    }

    pub async fn list_tasks(&self, module: Module) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE module = $1 ORDER BY slug",
        )
        .bind(module)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    pub async fn list_task_categories(&self, module: Module) -> Result<Vec<TaskCategory>, AppError> {
        let categories = sqlx::query_as::<_, TaskCategory>(
            "SELECT * FROM task_categories WHERE module = $1 ORDER BY name",
        )
        .bind(module)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn find_task(&self, module: Module, task_id: Uuid) -> Result<Option<Task>, AppError> {
        let maybe = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE id = $1 AND module = $2",
        )
        .bind(task_id)
        .bind(module)
        .fetch_optional(&self.pool)
        .await?;

        Ok(maybe)
    }

    // =========================================================================
    //  VÍNCULO CARGO <-> TAREFA
    // =========================================================================

    /// Liga um conjunto de tarefas a um cargo (reativando vínculos antigos,
    /// nunca duplicando).
    pub async fn attach_tasks<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        task_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Inserção em massa usando UNNEST
        sqlx::query(
            r#"
            INSERT INTO role_tasks (role_id, task_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT (role_id, task_id) DO UPDATE SET is_active = true
            "#,
        )
        .bind(role_id)
        .bind(task_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Liga/desliga uma tarefa do cargo. A linha nunca é apagada: o flag
    /// preserva o histórico de quem já teve o quê.
    pub async fn toggle_role_task<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        task_id: Uuid,
    ) -> Result<RoleTask, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoleTask>(
            r#"
            INSERT INTO role_tasks (role_id, task_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, task_id)
                DO UPDATE SET is_active = NOT role_tasks.is_active
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(task_id)
        .fetch_one(executor)
        .await
        .map_err(Into::into)
    }

    pub async fn active_task_slugs(&self, role_id: Uuid) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.slug
            FROM role_tasks rt
            JOIN tasks t ON t.id = rt.task_id
            WHERE rt.role_id = $1 AND rt.is_active
            ORDER BY t.slug
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slugs)
    }

    // =========================================================================
    //  VÍNCULO CARGO <-> USUÁRIO
    // =========================================================================

    /// O cargo ativo que o vínculo já tem neste módulo, se houver.
    pub async fn find_active_assignment<'e, E>(
        &self,
        executor: E,
        org_user_id: Uuid,
        org_id: Uuid,
        module: Module,
    ) -> Result<Option<ActiveRoleAssignment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe = sqlx::query_as::<_, ActiveRoleAssignment>(
            r#"
            SELECT r.id AS role_id, r.name AS role_name
            FROM role_users ru
            JOIN roles r ON r.id = ru.role_id AND r.is_active
            WHERE ru.org_user_id = $1
              AND ru.org_id = $2
              AND ru.module = $3
              AND ru.is_active
            "#,
        )
        .bind(org_user_id)
        .bind(org_id)
        .bind(module)
        .fetch_optional(executor)
        .await?;

        Ok(maybe)
    }

    /// Cria (ou reativa) o vínculo cargo-usuário.
    /// A regra "um cargo ativo por módulo" é garantida pelo índice único
    /// parcial; aqui só traduzimos a violação num erro de conflito.
    pub async fn upsert_assignment<'e, E>(
        &self,
        executor: E,
        org_id: Uuid,
        module: Module,
        role_id: Uuid,
        org_user_id: Uuid,
    ) -> Result<RoleUser, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoleUser>(
            r#"
            INSERT INTO role_users (org_id, module, role_id, org_user_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (role_id, org_user_id) DO UPDATE SET is_active = true
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(module)
        .bind(role_id)
        .bind(org_user_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    // Duas atribuições concorrentes: a segunda morre aqui,
                    // no banco, mesmo tendo passado na pré-checagem.
                    return AppError::UniqueConstraintViolation(
                        "O usuário já possui um cargo ativo neste módulo.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    /// Revogação = desativar o vínculo, nunca apagar (histórico/auditoria).
    pub async fn deactivate_assignment<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        org_user_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE role_users
            SET is_active = false
            WHERE role_id = $1 AND org_user_id = $2 AND is_active
            "#,
        )
        .bind(role_id)
        .bind(org_user_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// "O vínculo tem este cargo?" — existe vínculo ativo num cargo ativo
    /// com este slug, dentro da academia e do módulo.
    pub async fn has_role(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
        module: Module,
        role_slug: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_users ru
                JOIN roles r ON r.id = ru.role_id AND r.is_active
                WHERE ru.org_user_id = $1
                  AND ru.org_id = $2
                  AND ru.module = $3
                  AND r.slug = $4
                  AND ru.is_active
            )
            "#,
        )
        .bind(org_user_id)
        .bind(org_id)
        .bind(module)
        .bind(role_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Todos os cargos ativos que o vínculo possui (um por módulo, se a
    /// invariante vale — mas devolvemos a lista mesmo assim).
    pub async fn user_role_names(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM role_users ru
            JOIN roles r ON r.id = ru.role_id AND r.is_active
            WHERE ru.org_user_id = $1
              AND ru.org_id = $2
              AND ru.is_active
            ORDER BY r.name
            "#,
        )
        .bind(org_user_id)
        .bind(org_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    /// Quem ocupa o cargo hoje. Vínculos arquivados/excluídos ficam de fora
    /// da lista de gestão (mas continuam no banco, para histórico).
    pub async fn list_role_holders(&self, role_id: Uuid) -> Result<Vec<RoleHolder>, AppError> {
        let holders = sqlx::query_as::<_, RoleHolder>(
            r#"
            SELECT ou.id AS org_user_id, u.full_name, u.email
            FROM role_users ru
            JOIN org_users ou ON ou.id = ru.org_user_id
            JOIN users u ON u.id = ou.user_id
            WHERE ru.role_id = $1
              AND ru.is_active
              AND ou.is_active
              AND NOT ou.is_archived
              AND ou.deleted_at IS NULL
            ORDER BY u.full_name
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(holders)
    }

    /// "O vínculo pode executar esta tarefa?"
    /// Vale por cargo ativo com a tarefa ligada — ou por cargo protegido:
    /// o Admin tem capacidade total por construção, sem enumerar tarefa a
    /// tarefa.
    pub async fn org_user_has_task(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
        task_slug: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role_users ru
                JOIN roles r ON r.id = ru.role_id AND r.is_active
                WHERE ru.org_user_id = $1
                  AND ru.org_id = $2
                  AND ru.is_active
                  AND (
                      r.is_protected
                      OR EXISTS (
                          SELECT 1
                          FROM role_tasks rt
                          JOIN tasks t ON t.id = rt.task_id
                          WHERE rt.role_id = r.id
                            AND rt.is_active
                            AND t.slug = $3
                      )
                  )
            )
            "#,
        )
        .bind(org_user_id)
        .bind(org_id)
        .bind(task_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
