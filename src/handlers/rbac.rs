// src/handlers/rbac.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    db::rbac_repo::RoleHolder,
    middleware::{
        rbac::{RequireTask, TaskStaffRead, TaskStaffWrite},
        tenancy::TenantScope,
    },
    models::rbac::{CreateRolePayload, Module, Role, RoleResponse, TaskCatalogEntry},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleQuery {
    pub module: Module,
    // Visão de recuperação (inclui cargos desativados) — só para Admin
    #[serde(default)]
    pub include_inactive: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub org_user_id: Uuid,
}

// POST /api/rbac/roles
#[utoipa::path(
    post,
    path = "/api/rbac/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado", body = RoleResponse),
        (status = 409, description = "Nome de cargo já usado no módulo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffWrite>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    let org_id = scope.require_org()?;

    let response = app_state
        .rbac_service
        .create_role(
            org_id,
            payload.module,
            &payload.name,
            payload.description.as_deref(),
            payload.tasks,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/rbac/roles?module=foh
#[utoipa::path(
    get,
    path = "/api/rbac/roles",
    tag = "RBAC",
    params(
        ("module" = Module, Query, description = "Namespace dos cargos"),
        ("includeInactive" = bool, Query, description = "Visão de recuperação (somente Admin)")
    ),
    responses((status = 200, description = "Cargos da academia no módulo", body = Vec<Role>)),
    security(("api_jwt" = []))
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffRead>,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Vec<Role>>, AppError> {
    let org_id = scope.require_org()?;

    let roles = if query.include_inactive {
        // A visão com cargos desativados é restrita a quem tem o cargo Admin
        let org_user_id = scope.require_org_user()?;
        let is_admin = app_state
            .rbac_service
            .has_role(org_user_id, org_id, Module::Admin, "Admin")
            .await?;
        if !is_admin {
            return Err(AppError::AdminRoleRequired);
        }

        app_state
            .rbac_repo
            .list_roles_including_inactive(org_id, query.module)
            .await?
    } else {
        app_state.rbac_service.list_roles(org_id, query.module).await?
    };

    Ok(Json(roles))
}

// GET /api/rbac/me (os cargos do vínculo logado)
#[utoipa::path(
    get,
    path = "/api/rbac/me",
    tag = "RBAC",
    responses((status = 200, description = "Nomes dos cargos ativos do vínculo atual", body = Vec<String>)),
    security(("api_jwt" = []))
)]
pub async fn my_roles(
    State(app_state): State<AppState>,
    scope: TenantScope,
) -> Result<Json<Vec<String>>, AppError> {
    let org_id = scope.require_org()?;
    let org_user_id = scope.require_org_user()?;

    let roles = app_state.rbac_service.user_roles(org_user_id, org_id).await?;
    Ok(Json(roles))
}

// GET /api/rbac/roles/{role_id}
#[utoipa::path(
    get,
    path = "/api/rbac/roles/{role_id}",
    tag = "RBAC",
    params(("role_id" = Uuid, Path, description = "ID do cargo")),
    responses((status = 200, description = "Cargo com as tarefas ativas", body = RoleResponse)),
    security(("api_jwt" = []))
)]
pub async fn get_role(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffRead>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<RoleResponse>, AppError> {
    let org_id = scope.require_org()?;
    let response = app_state.rbac_service.role_with_tasks(org_id, role_id).await?;
    Ok(Json(response))
}

// GET /api/rbac/roles/{role_id}/holders
#[utoipa::path(
    get,
    path = "/api/rbac/roles/{role_id}/holders",
    tag = "RBAC",
    params(("role_id" = Uuid, Path, description = "ID do cargo")),
    responses((status = 200, description = "Quem ocupa o cargo hoje", body = Vec<RoleHolder>)),
    security(("api_jwt" = []))
)]
pub async fn list_role_holders(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffRead>,
    Path(role_id): Path<Uuid>,
) -> Result<Json<Vec<RoleHolder>>, AppError> {
    let org_id = scope.require_org()?;

    // Garante que o cargo é da academia atual antes de listar ocupantes
    app_state
        .rbac_service
        .role_with_tasks(org_id, role_id)
        .await?;
    let holders = app_state.rbac_repo.list_role_holders(role_id).await?;

    Ok(Json(holders))
}

// POST /api/rbac/roles/{role_id}/assign
#[utoipa::path(
    post,
    path = "/api/rbac/roles/{role_id}/assign",
    tag = "RBAC",
    params(("role_id" = Uuid, Path, description = "ID do cargo")),
    request_body = AssignmentPayload,
    responses(
        (status = 204, description = "Cargo atribuído"),
        (status = 409, description = "Usuário já tem cargo ativo no módulo (a mensagem nomeia qual)")
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffWrite>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let org_id = scope.require_org()?;

    app_state
        .rbac_service
        .assign_role(org_id, role_id, payload.org_user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/rbac/roles/{role_id}/remove
#[utoipa::path(
    post,
    path = "/api/rbac/roles/{role_id}/remove",
    tag = "RBAC",
    params(("role_id" = Uuid, Path, description = "ID do cargo")),
    request_body = AssignmentPayload,
    responses(
        (status = 204, description = "Cargo revogado"),
        (status = 403, description = "Auto-remoção de cargo protegido")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_role(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffWrite>,
    Path(role_id): Path<Uuid>,
    Json(payload): Json<AssignmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    let org_id = scope.require_org()?;
    let actor_org_user_id = scope.require_org_user()?;

    app_state
        .rbac_service
        .remove_role(org_id, role_id, actor_org_user_id, payload.org_user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/rbac/roles/{role_id}/tasks/{task_id}/toggle
#[utoipa::path(
    post,
    path = "/api/rbac/roles/{role_id}/tasks/{task_id}/toggle",
    tag = "RBAC",
    params(
        ("role_id" = Uuid, Path, description = "ID do cargo"),
        ("task_id" = Uuid, Path, description = "ID da tarefa")
    ),
    responses(
        (status = 200, description = "Tarefa ligada/desligada"),
        (status = 403, description = "Cargo protegido: conjunto de tarefas imutável")
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_role_task(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffWrite>,
    Path((role_id, task_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let org_id = scope.require_org()?;

    let toggled = app_state
        .rbac_service
        .toggle_task(org_id, role_id, task_id)
        .await?;

    Ok(Json(toggled))
}

// GET /api/rbac/tasks?module=foh (para o frontend montar a tela de permissões)
#[utoipa::path(
    get,
    path = "/api/rbac/tasks",
    tag = "RBAC",
    params(("module" = Module, Query, description = "Namespace das tarefas")),
    responses((status = 200, description = "Catálogo de tarefas agrupado por categoria", body = Vec<TaskCatalogEntry>)),
    security(("api_jwt" = []))
)]
pub async fn list_tasks(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskStaffRead>,
    Query(query): Query<ModuleQuery>,
) -> Result<Json<Vec<TaskCatalogEntry>>, AppError> {
    scope.require_org()?;
    let catalog = app_state.rbac_service.task_catalog(query.module).await?;
    Ok(Json(catalog))
}
