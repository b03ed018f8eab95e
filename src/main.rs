//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::access::{foh_guard, staff_guard};
use crate::middleware::auth::auth_guard;
use crate::middleware::tenancy::tenant_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Define as rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/organizations", get(handlers::auth::get_my_organizations))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Gestão de academias e troca de academia atual (a "seleção")
    let org_routes = Router::new()
        .route(
            "/",
            post(handlers::tenancy::create_organization),
        )
        .route("/memberships", get(handlers::tenancy::list_my_memberships))
        .route("/select", post(handlers::tenancy::select_organization))
        .route("/current", get(handlers::tenancy::get_current_organization))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // RBAC: área administrativa da equipe.
    // Ordem de execução: auth -> tenant -> segregação de staff.
    let rbac_routes = Router::new()
        .route(
            "/roles",
            post(handlers::rbac::create_role).get(handlers::rbac::list_roles),
        )
        .route("/roles/{role_id}", get(handlers::rbac::get_role))
        .route("/roles/{role_id}/holders", get(handlers::rbac::list_role_holders))
        .route("/roles/{role_id}/assign", post(handlers::rbac::assign_role))
        .route("/roles/{role_id}/remove", post(handlers::rbac::remove_role))
        .route(
            "/roles/{role_id}/tasks/{task_id}/toggle",
            post(handlers::rbac::toggle_role_task),
        )
        .route("/tasks", get(handlers::rbac::list_tasks))
        .route("/me", get(handlers::rbac::my_roles))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            staff_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Operação da recepção (alunos): exige a flag FOH no vínculo atual.
    // Ordem de execução: auth -> tenant -> segregação de staff -> portão FOH.
    let member_routes = Router::new()
        .route(
            "/",
            post(handlers::members::register_member).get(handlers::members::list_members),
        )
        .route(
            "/{member_id}",
            axum::routing::delete(handlers::members::remove_member),
        )
        .route("/{member_id}/archive", post(handlers::members::archive_member))
        .route("/{member_id}/passes", get(handlers::plans::list_member_passes))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            foh_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            staff_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let plan_routes = Router::new()
        .route(
            "/plans",
            post(handlers::plans::create_plan).get(handlers::plans::list_plans),
        )
        .route("/passes", post(handlers::plans::sell_pass))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            foh_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            staff_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/orgs", org_routes)
        .nest("/api/rbac", rbac_routes)
        .nest("/api/members", member_routes)
        .nest("/api", plan_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
