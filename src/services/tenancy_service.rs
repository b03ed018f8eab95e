// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrgRepository, RbacRepository, UserRepository},
    models::auth::User,
    models::rbac::Module,
    models::tenancy::{Organization, OrgMembership, OrgUser},
    services::rbac_service::slugify,
};

#[derive(Clone)]
pub struct TenancyService {
    org_repo: OrgRepository,
    rbac_repo: RbacRepository,
    user_repo: UserRepository,
    pool: PgPool, // Usamos a pool para iniciar transações
}

impl TenancyService {
    pub fn new(
        org_repo: OrgRepository,
        rbac_repo: RbacRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            org_repo,
            rbac_repo,
            user_repo,
            pool,
        }
    }

    /// O vínculo que vale para este usuário AGORA.
    /// A resolução confere dono, estado operacional e academia viva — um
    /// ponteiro obsoleto ou forjado em users.current_org_user_id vira `None`.
    pub async fn current_membership(&self, user: &User) -> Result<Option<OrgUser>, AppError> {
        let Some(org_user_id) = user.current_org_user_id else {
            return Ok(None);
        };

        self.org_repo
            .find_operational_org_user(org_user_id, user.id)
            .await
    }

    /// O contrato central de contexto de tenant: qual org_id vale para este
    /// usuário AGORA. `None` significa "sem academia" — e o chamador trata
    /// como "nenhum dado de tenant visível", jamais como acesso irrestrito.
    pub async fn current_org_id(&self, user: &User) -> Result<Option<Uuid>, AppError> {
        Ok(self.current_membership(user).await?.map(|ou| ou.org_id))
    }

    /// LÓGICA DE NEGÓCIO: Cria uma nova Academia e, atomicamente, torna quem
    /// criou o primeiro membro da equipe — com o cargo Admin protegido.
    pub async fn create_organization_with_owner(
        &self,
        name: &str,
        description: Option<&str>,
        owner: &User,
    ) -> Result<Organization, AppError> {
        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria a Academia
        let new_org = self
            .org_repo
            .create_organization(&mut *tx, name, description)
            .await?;

        // 3. Cria o vínculo do dono (com acesso à recepção)
        let owner_org_user = self
            .org_repo
            .create_org_user(&mut *tx, new_org.id, owner.id, true)
            .await?;

        // 4. Cria o cargo Admin protegido. Protegido = capacidade total por
        // construção: nada de enumerar tarefa a tarefa, nada de edição.
        let admin_role = self
            .rbac_repo
            .create_role(
                &mut *tx,
                new_org.id,
                Module::Admin,
                "Admin",
                &slugify("Admin"),
                Some("Acesso total administrativo (gerado automaticamente)"),
                true,
            )
            .await?;

        // 5. Atribui o cargo ao dono
        self.rbac_repo
            .upsert_assignment(
                &mut *tx,
                new_org.id,
                Module::Admin,
                admin_role.id,
                owner_org_user.id,
            )
            .await?;

        // 6. Se o usuário ainda não tem academia atual, esta vira a atual
        if owner.current_org_user_id.is_none() {
            self.user_repo
                .set_current_org_user(&mut *tx, owner.id, Some(owner_org_user.id))
                .await?;
        }

        // 7. Commit
        tx.commit().await?;

        Ok(new_org)
    }

    /// Troca a academia atual da sessão. Só depois de confirmar que o
    /// usuário realmente tem vínculo operacional na academia de destino.
    pub async fn switch_organization(
        &self,
        user: &User,
        org_id: Uuid,
    ) -> Result<OrgUser, AppError> {
        let membership = self
            .org_repo
            .find_membership_for_org(user.id, org_id)
            .await?
            .ok_or(AppError::MembershipNotFound)?;

        let mut tx = self.pool.begin().await?;
        self.user_repo
            .set_current_org_user(&mut *tx, user.id, Some(membership.id))
            .await?;
        tx.commit().await?;

        Ok(membership)
    }

    pub async fn list_user_organizations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Organization>, AppError> {
        self.org_repo.list_user_organizations(user_id).await
    }

    pub async fn list_memberships(&self, user_id: Uuid) -> Result<Vec<OrgMembership>, AppError> {
        self.org_repo.list_memberships(user_id).await
    }
}
