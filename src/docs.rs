// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::db;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_organizations,

        // --- Tenancy ---
        handlers::tenancy::create_organization,
        handlers::tenancy::list_my_memberships,
        handlers::tenancy::select_organization,
        handlers::tenancy::get_current_organization,

        // --- RBAC ---
        handlers::rbac::create_role,
        handlers::rbac::list_roles,
        handlers::rbac::get_role,
        handlers::rbac::list_role_holders,
        handlers::rbac::assign_role,
        handlers::rbac::remove_role,
        handlers::rbac::toggle_role_task,
        handlers::rbac::list_tasks,
        handlers::rbac::my_roles,

        // --- Members ---
        handlers::members::register_member,
        handlers::members::list_members,
        handlers::members::archive_member,
        handlers::members::remove_member,

        // --- Plans ---
        handlers::plans::create_plan,
        handlers::plans::list_plans,
        handlers::plans::sell_pass,
        handlers::plans::list_member_passes,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Tenancy ---
            models::tenancy::Organization,
            models::tenancy::OrgUser,
            models::tenancy::OrgMembership,
            handlers::tenancy::CreateOrganizationPayload,
            handlers::tenancy::SelectOrganizationPayload,
            handlers::tenancy::CurrentOrgResponse,

            // --- RBAC ---
            models::rbac::Module,
            models::rbac::Role,
            models::rbac::Task,
            models::rbac::TaskCategory,
            models::rbac::RoleUser,
            models::rbac::RoleTask,
            models::rbac::CreateRolePayload,
            models::rbac::RoleResponse,
            models::rbac::TaskCatalogEntry,
            handlers::rbac::AssignmentPayload,
            db::rbac_repo::RoleHolder,

            // --- Members ---
            models::members::Member,
            models::members::MemberStatus,
            models::members::RegisterMemberPayload,

            // --- Plans ---
            models::plans::MembershipPlan,
            models::plans::MemberPass,
            models::plans::CreatePlanPayload,
            models::plans::SellPassPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Tenancy", description = "Gestão de Academias e Vínculos"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Tarefas)"),
        (name = "Members", description = "Gestão de Alunos"),
        (name = "Plans", description = "Planos de Matrícula e Passes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
