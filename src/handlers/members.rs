// src/handlers/members.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::begin_scoped_tx, error::AppError},
    config::AppState,
    middleware::{
        rbac::{RequireTask, TaskMembersRead, TaskMembersWrite},
        tenancy::TenantScope,
    },
    models::members::{Member, RegisterMemberPayload},
};

// POST /api/members
#[utoipa::path(
    post,
    path = "/api/members",
    tag = "Members",
    request_body = RegisterMemberPayload,
    responses(
        (status = 201, description = "Aluno cadastrado", body = Member),
        (status = 409, description = "E-mail/telefone/nome reservado (inclusive por aluno excluído)")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskMembersWrite>,
    Json(payload): Json<RegisterMemberPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let org_id = scope.require_org()?;

    // Transação com escopo de tenant: o RLS filtra tudo aqui dentro
    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let member = app_state
        .member_service
        .register_member(&mut tx, org_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(member)))
}

// GET /api/members
#[utoipa::path(
    get,
    path = "/api/members",
    tag = "Members",
    responses((status = 200, description = "Alunos ativos da academia", body = Vec<Member>)),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskMembersRead>,
) -> Result<Json<Vec<Member>>, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let members = app_state.member_repo.list_members(&mut *tx, org_id).await?;
    tx.commit().await?;

    Ok(Json(members))
}

// POST /api/members/{member_id}/archive
#[utoipa::path(
    post,
    path = "/api/members/{member_id}/archive",
    tag = "Members",
    params(("member_id" = Uuid, Path, description = "ID do aluno")),
    responses((status = 200, description = "Aluno arquivado: identidade liberada para reuso", body = Member)),
    security(("api_jwt" = []))
)]
pub async fn archive_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskMembersWrite>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let member = app_state
        .member_service
        .archive_member(&mut tx, org_id, member_id)
        .await?;
    tx.commit().await?;

    Ok(Json(member))
}

// DELETE /api/members/{member_id}
#[utoipa::path(
    delete,
    path = "/api/members/{member_id}",
    tag = "Members",
    params(("member_id" = Uuid, Path, description = "ID do aluno")),
    responses((status = 200, description = "Aluno excluído (soft delete): identidade segue reservada", body = Member)),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskMembersWrite>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Member>, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let member = app_state
        .member_service
        .remove_member(&mut tx, org_id, member_id)
        .await?;
    tx.commit().await?;

    Ok(Json(member))
}
