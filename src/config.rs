// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{MemberRepository, OrgRepository, PlanRepository, RbacRepository, UserRepository},
    services::{
        auth::AuthService, member_service::MemberService, plan_service::PlanService,
        rbac_service::RbacService, tenancy_service::TenancyService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    // Repositórios que os middlewares consultam diretamente
    pub org_repo: OrgRepository,
    pub rbac_repo: RbacRepository,
    pub member_repo: MemberRepository,
    pub plan_repo: PlanRepository,

    // Serviços (regras de negócio)
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub rbac_service: RbacService,
    pub member_service: MemberService,
    pub plan_service: PlanService,
}

impl AppState {
    // A assinatura retorna um Result: se a configuração falhar, quem decide
    // o que fazer é o main.
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrgRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let member_repo = MemberRepository::new();
        let plan_repo = PlanRepository::new();

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let tenancy_service = TenancyService::new(
            org_repo.clone(),
            rbac_repo.clone(),
            user_repo,
            db_pool.clone(),
        );
        let rbac_service =
            RbacService::new(rbac_repo.clone(), org_repo.clone(), db_pool.clone());
        let member_service = MemberService::new(member_repo.clone());
        let plan_service = PlanService::new(plan_repo.clone(), member_repo.clone());

        Ok(Self {
            db_pool,
            org_repo,
            rbac_repo,
            member_repo,
            plan_repo,
            auth_service,
            tenancy_service,
            rbac_service,
            member_service,
            plan_service,
        })
    }
}
