// src/handlers/plans.rs

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
        rbac::{RequireTask, TaskPassesWrite, TaskPlansRead, TaskPlansWrite},
        tenancy::TenantScope,
    },
    models::plans::{CreatePlanPayload, MemberPass, MembershipPlan, SellPassPayload},
};

// POST /api/plans
#[utoipa::path(
    post,
    path = "/api/plans",
    tag = "Plans",
    request_body = CreatePlanPayload,
    responses(
        (status = 201, description = "Plano criado", body = MembershipPlan),
        (status = 409, description = "Nome de plano já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskPlansWrite>,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let plan = app_state
        .plan_service
        .create_plan(&mut tx, org_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    tag = "Plans",
    responses((status = 200, description = "Planos ativos da academia", body = Vec<MembershipPlan>)),
    security(("api_jwt" = []))
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskPlansRead>,
) -> Result<Json<Vec<MembershipPlan>>, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let plans = app_state.plan_repo.list_plans(&mut *tx, org_id).await?;
    tx.commit().await?;

    Ok(Json(plans))
}

// POST /api/passes
#[utoipa::path(
    post,
    path = "/api/passes",
    tag = "Plans",
    request_body = SellPassPayload,
    responses(
        (status = 201, description = "Passe vendido", body = MemberPass),
        (status = 404, description = "Aluno ou plano inexistente na academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn sell_pass(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskPassesWrite>,
    Json(payload): Json<SellPassPayload>,
) -> Result<impl IntoResponse, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let pass = app_state
        .plan_service
        .sell_pass(&mut tx, org_id, &payload)
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(pass)))
}

// GET /api/members/{member_id}/passes
#[utoipa::path(
    get,
    path = "/api/members/{member_id}/passes",
    tag = "Plans",
    params(("member_id" = Uuid, Path, description = "ID do aluno")),
    responses((status = 200, description = "Passes do aluno, mais recente primeiro", body = Vec<MemberPass>)),
    security(("api_jwt" = []))
)]
pub async fn list_member_passes(
    State(app_state): State<AppState>,
    scope: TenantScope,
    _perm: RequireTask<TaskPlansRead>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<Vec<MemberPass>>, AppError> {
    let org_id = scope.require_org()?;

    let mut tx = begin_scoped_tx(&app_state, &scope).await?;
    let passes = app_state
        .plan_repo
        .list_passes_for_member(&mut *tx, org_id, member_id)
        .await?;
    tx.commit().await?;

    Ok(Json(passes))
}
