// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Module (O "Namespace" de cargos e tarefas)
// ---
// Particiona o RBAC em áreas independentes: o mesmo nome de cargo pode
// existir em 'foh' e em 'admin' sem colisão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Module {
    // Recepção / operação do dia a dia
    Foh,
    // Gestão da academia
    Admin,
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)] // Ocultamos org_id da documentação pública
    pub org_id: Uuid,

    pub module: Module,

    #[schema(example = "Recepcionista")]
    pub name: String,

    #[schema(example = "recepcionista")]
    pub slug: String,

    #[schema(example = "Atende a recepção e cadastra alunos")]
    pub description: Option<String>,

    pub is_active: bool,

    // Cargo protegido (Admin): conjunto de tarefas imutável e o próprio
    // titular não consegue se remover dele.
    pub is_protected: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que sai do banco (Tabela tasks)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440001")]
    pub id: Uuid,

    pub module: Module,

    pub category_id: Option<Uuid>,

    #[schema(example = "members:write")]
    pub slug: String,

    #[schema(example = "Cadastrar e editar alunos")]
    pub description: String,
}

// Rótulo de agrupamento das tarefas (só organização visual, sem semântica
// de autorização)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskCategory {
    pub id: Uuid,
    pub module: Module,
    #[schema(example = "Alunos")]
    pub name: String,
}

// Vínculo cargo <-> usuário da academia
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleUser {
    pub id: Uuid,
    #[schema(ignore)]
    pub org_id: Uuid,
    pub module: Module,
    pub role_id: Uuid,
    pub org_user_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Vínculo cargo <-> tarefa (desligado, nunca apagado)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleTask {
    pub id: Uuid,
    pub role_id: Uuid,
    pub task_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O Payload para criar um cargo
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    pub module: Module,

    #[schema(example = "Instrutor")]
    pub name: String,

    #[schema(example = "Acompanha treinos e consulta alunos")]
    pub description: Option<String>,

    #[schema(example = json!(["members:read", "plans:read"]))]
    pub tasks: Vec<String>, // Slugs das tarefas
}

// Resposta completa (Cargo + Lista de Tarefas ativas)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,

    #[schema(example = json!(["members:read", "plans:read"]))]
    pub tasks: Vec<String>,
}

// Catálogo de tarefas agrupado por categoria (para a tela de permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskCatalogEntry {
    pub category: Option<TaskCategory>,
    pub tasks: Vec<Task>,
}
