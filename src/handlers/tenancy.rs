// src/handlers/tenancy.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::{Organization, OrgMembership, OrgUser},
};

// ---
// 1. "Payloads" (O "Formulário" da API)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrganizationPayload {
    #[validate(length(min = 1, message = "O nome da academia é obrigatório."))]
    #[schema(example = "Academia Central")]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectOrganizationPayload {
    pub org_id: Uuid,
}

#[derive(Debug, serde::Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrgResponse {
    // Nulo = nenhuma academia selecionada (e nenhum dado de tenant visível)
    pub current_org_id: Option<Uuid>,
}

// ---
// 2. Os "Handlers" (As Rotas)
// ---

#[utoipa::path(
    post,
    path = "/api/orgs",
    tag = "Tenancy",
    request_body = CreateOrganizationPayload,
    responses(
        (status = 201, description = "Academia criada com o criador como Admin", body = Organization),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_organization(
    State(app_state): State<AppState>,
    // Precisamos do usuário autenticado para o tornarmos "dono"
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateOrganizationPayload>,
) -> Result<impl IntoResponse, AppError> {
    // 1. Validar o payload
    payload.validate().map_err(AppError::ValidationError)?;

    // 2. Chamar o Serviço (operação transacional: criar a academia E o
    // vínculo E o cargo Admin protegido)
    let new_org = app_state
        .tenancy_service
        .create_organization_with_owner(&payload.name, payload.description.as_deref(), &user)
        .await?;

    // 3. Responder com Sucesso
    Ok((StatusCode::CREATED, Json(new_org)))
}

#[utoipa::path(
    get,
    path = "/api/orgs/memberships",
    tag = "Tenancy",
    responses((status = 200, description = "Vínculos do usuário, academia a academia", body = Vec<OrgMembership>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_memberships(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<OrgMembership>>, AppError> {
    let memberships = app_state.tenancy_service.list_memberships(user.id).await?;
    Ok(Json(memberships))
}

// Qual academia vale para a sessão atual (para o frontend se orientar)
#[utoipa::path(
    get,
    path = "/api/orgs/current",
    tag = "Tenancy",
    responses((status = 200, description = "Academia atual da sessão, se houver", body = CurrentOrgResponse)),
    security(("api_jwt" = []))
)]
pub async fn get_current_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<CurrentOrgResponse>, AppError> {
    let current_org_id = app_state.tenancy_service.current_org_id(&user).await?;
    Ok(Json(CurrentOrgResponse { current_org_id }))
}

// A "seleção de academia": para onde o portão FOH manda quem tem acesso em
// outra academia. Confirma o vínculo e troca o ponteiro da sessão.
#[utoipa::path(
    post,
    path = "/api/orgs/select",
    tag = "Tenancy",
    request_body = SelectOrganizationPayload,
    responses(
        (status = 200, description = "Academia atual trocada", body = OrgUser),
        (status = 404, description = "Usuário não tem vínculo nesta academia")
    ),
    security(("api_jwt" = []))
)]
pub async fn select_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<SelectOrganizationPayload>,
) -> Result<Json<OrgUser>, AppError> {
    let membership = app_state
        .tenancy_service
        .switch_organization(&user, payload.org_id)
        .await?;

    Ok(Json(membership))
}
