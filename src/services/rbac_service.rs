// src/services/rbac_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{rbac_repo::ActiveRoleAssignment, OrgRepository, RbacRepository},
    models::rbac::{Module, Role, RoleResponse, RoleTask, RoleUser, TaskCatalogEntry},
    models::tenancy::OrgUser,
};

// ---
// O ponto único de decisão e mutação do RBAC.
// ---
// Toda pergunta "este vínculo pode fazer X?" e toda mudança de cargo passa
// por aqui. Nada é cacheado entre requests: revogou, valeu na hora.
//
// As invariantes (um cargo por módulo, cargo protegido imutável, guarda de
// auto-bloqueio) são validadas ANTES de qualquer escrita, dentro de uma
// transação — e a regra de um-cargo-por-módulo tem o índice único parcial
// do banco como garantia final contra requests concorrentes.
#[derive(Clone)]
pub struct RbacService {
    rbac_repo: RbacRepository,
    org_repo: OrgRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(rbac_repo: RbacRepository, org_repo: OrgRepository, pool: PgPool) -> Self {
        Self {
            rbac_repo,
            org_repo,
            pool,
        }
    }

    // =========================================================================
    //  CONSULTAS (o "lado allow/deny")
    // =========================================================================

    /// true se existe vínculo ativo num cargo ativo com este nome/slug, no
    /// módulo e na academia do vínculo.
    pub async fn has_role(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
        module: Module,
        role_name: &str,
    ) -> Result<bool, AppError> {
        self.rbac_repo
            .has_role(org_user_id, org_id, module, &slugify(role_name))
            .await
    }

    /// Os nomes dos cargos ativos do vínculo (insumo da checagem de
    /// um-cargo-por-módulo e das telas de equipe).
    pub async fn user_roles(
        &self,
        org_user_id: Uuid,
        org_id: Uuid,
    ) -> Result<Vec<String>, AppError> {
        self.rbac_repo.user_role_names(org_user_id, org_id).await
    }

    pub async fn list_roles(&self, org_id: Uuid, module: Module) -> Result<Vec<Role>, AppError> {
        self.rbac_repo.list_roles(org_id, module).await
    }

    pub async fn role_with_tasks(
        &self,
        org_id: Uuid,
        role_id: Uuid,
    ) -> Result<RoleResponse, AppError> {
        let role = self
            .rbac_repo
            .find_role(org_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;
        let tasks = self.rbac_repo.active_task_slugs(role.id).await?;

        Ok(RoleResponse { role, tasks })
    }

    /// O catálogo de tarefas de um módulo, agrupado por categoria (para a
    /// tela de permissões). Categoria é só rótulo: não carrega autorização.
    pub async fn task_catalog(&self, module: Module) -> Result<Vec<TaskCatalogEntry>, AppError> {
        let categories = self.rbac_repo.list_task_categories(module).await?;
        let mut tasks = self.rbac_repo.list_tasks(module).await?;

        let mut catalog = Vec::with_capacity(categories.len() + 1);
        for category in categories {
            let (of_category, rest): (Vec<_>, Vec<_>) = tasks
                .into_iter()
                .partition(|t| t.category_id == Some(category.id));
            tasks = rest;
            catalog.push(TaskCatalogEntry {
                category: Some(category),
                tasks: of_category,
            });
        }

        // Tarefas sem categoria vão num grupo final
        if !tasks.is_empty() {
            catalog.push(TaskCatalogEntry {
                category: None,
                tasks,
            });
        }

        Ok(catalog)
    }

    // =========================================================================
    //  MUTAÇÕES
    // =========================================================================

    pub async fn create_role(
        &self,
        org_id: Uuid,
        module: Module,
        name: &str,
        description: Option<&str>,
        task_slugs: Vec<String>,
    ) -> Result<RoleResponse, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Cargo (cargos criados via API nunca nascem protegidos)
        let role = self
            .rbac_repo
            .create_role(
                &mut *tx,
                org_id,
                module,
                name,
                &slugify(name),
                description,
                false,
            )
            .await?;

        // 3. Resolve Slugs ("members:read") para IDs e salva o vínculo
        let tasks = self
            .rbac_repo
            .find_tasks_by_slugs(&mut *tx, module, &task_slugs)
            .await?;

        let task_ids: Vec<Uuid> = tasks.iter().map(|t| t.id).collect();
        let valid_slugs: Vec<String> = tasks.into_iter().map(|t| t.slug).collect();

        if !task_ids.is_empty() {
            self.rbac_repo.attach_tasks(&mut *tx, role.id, &task_ids).await?;
        }

        // 4. Commit
        tx.commit().await?;

        Ok(RoleResponse {
            role,
            tasks: valid_slugs,
        })
    }

    /// Atribui um cargo a um vínculo da MESMA academia.
    ///
    /// Falha com conflito se o vínculo já tem qualquer cargo ativo no módulo
    /// (nomeando o cargo atual na mensagem), inclusive quando é exatamente o
    /// cargo pedido. A checagem e a escrita compartilham a transação; o
    /// índice único parcial segura o caso de dois requests simultâneos.
    pub async fn assign_role(
        &self,
        org_id: Uuid,
        role_id: Uuid,
        target_org_user_id: Uuid,
    ) -> Result<RoleUser, AppError> {
        let role = self
            .rbac_repo
            .find_role(org_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        let target = self
            .org_repo
            .find_org_user_in_org(target_org_user_id, org_id)
            .await?
            .ok_or(AppError::MembershipNotFound)?;

        let mut tx = self.pool.begin().await?;

        let existing = self
            .rbac_repo
            .find_active_assignment(&mut *tx, target.id, org_id, role.module)
            .await?;

        ensure_assignable(&role, &target, existing.as_ref())?;

        let assignment = self
            .rbac_repo
            .upsert_assignment(&mut *tx, org_id, role.module, role.id, target.id)
            .await?;

        tx.commit().await?;

        Ok(assignment)
    }

    /// Revoga um cargo (desativa o vínculo).
    /// Guarda anti-bloqueio: quem tem o cargo protegido não consegue
    /// removê-lo de si mesmo — sempre sobra um administrador.
    pub async fn remove_role(
        &self,
        org_id: Uuid,
        role_id: Uuid,
        actor_org_user_id: Uuid,
        target_org_user_id: Uuid,
    ) -> Result<(), AppError> {
        let role = self
            .rbac_repo
            .find_role(org_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        ensure_removal_allowed(&role, actor_org_user_id, target_org_user_id)?;

        let mut tx = self.pool.begin().await?;

        let removed = self
            .rbac_repo
            .deactivate_assignment(&mut *tx, role.id, target_org_user_id)
            .await?;

        if !removed {
            return Err(AppError::RoleNotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    /// Liga/desliga uma tarefa de um cargo.
    /// Cargo protegido tem conjunto de tarefas fixo: sempre Forbidden.
    pub async fn toggle_task(
        &self,
        org_id: Uuid,
        role_id: Uuid,
        task_id: Uuid,
    ) -> Result<RoleTask, AppError> {
        let role = self
            .rbac_repo
            .find_role(org_id, role_id)
            .await?
            .ok_or(AppError::RoleNotFound)?;

        ensure_task_toggle_allowed(&role)?;

        self.rbac_repo
            .find_task(role.module, task_id)
            .await?
            .ok_or(AppError::TaskNotFound)?;

        let mut tx = self.pool.begin().await?;
        let toggled = self
            .rbac_repo
            .toggle_role_task(&mut *tx, role.id, task_id)
            .await?;
        tx.commit().await?;

        Ok(toggled)
    }
}

// ---
// As invariantes, como funções puras
// ---
// Separadas do acesso a banco para serem testáveis uma a uma.

/// Um vínculo só recebe cargo da própria academia, no módulo que ele pode
/// atuar (cargo FOH exige flag FOH) e se não tiver NENHUM cargo ativo no
/// módulo — a política de cargo único. O erro nomeia o cargo atual.
fn ensure_assignable(
    role: &Role,
    target: &OrgUser,
    existing: Option<&ActiveRoleAssignment>,
) -> Result<(), AppError> {
    if role.module == Module::Foh && !target.is_foh_user {
        return Err(AppError::FohAccessRequired);
    }

    if let Some(current) = existing {
        // Cobre os dois conflitos: repetir o mesmo cargo e empilhar um
        // segundo cargo no módulo. A mensagem sempre nomeia o cargo atual.
        let existing = if current.role_id == role.id {
            role.name.clone()
        } else {
            current.role_name.clone()
        };
        return Err(AppError::RoleAlreadyAssigned { existing });
    }

    Ok(())
}

fn ensure_removal_allowed(
    role: &Role,
    actor_org_user_id: Uuid,
    target_org_user_id: Uuid,
) -> Result<(), AppError> {
    if role.is_protected && actor_org_user_id == target_org_user_id {
        return Err(AppError::SelfLockout);
    }
    Ok(())
}

fn ensure_task_toggle_allowed(role: &Role) -> Result<(), AppError> {
    if role.is_protected {
        return Err(AppError::ProtectedRoleImmutable);
    }
    Ok(())
}

/// Slug derivado do nome: minúsculas, tudo que não for alfanumérico vira um
/// único hífen. "Gerente de Vendas" => "gerente-de-vendas".
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true; // evita hífen no começo

    for c in name.chars() {
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn role(module: Module, name: &str, is_protected: bool) -> Role {
        Role {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            module,
            name: name.to_string(),
            slug: slugify(name),
            description: None,
            is_active: true,
            is_protected,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn org_user(is_foh_user: bool) -> OrgUser {
        OrgUser {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            is_foh_user,
            is_active: true,
            is_archived: false,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn atribuicao_conflita_nomeando_o_cargo_existente() {
        // Cenário: o vínculo já é "Treinador" no módulo foh; tentar
        // atribuir "Recepcionista" tem que falhar citando "Treinador".
        let novo = role(Module::Foh, "Recepcionista", false);
        let alvo = org_user(true);
        let atual = ActiveRoleAssignment {
            role_id: Uuid::new_v4(),
            role_name: "Treinador".to_string(),
        };

        let err = ensure_assignable(&novo, &alvo, Some(&atual)).unwrap_err();
        match err {
            AppError::RoleAlreadyAssigned { existing } => assert_eq!(existing, "Treinador"),
            other => panic!("erro inesperado: {other:?}"),
        }
    }

    #[test]
    fn reatribuir_o_mesmo_cargo_tambem_conflita() {
        let cargo = role(Module::Foh, "Treinador", false);
        let alvo = org_user(true);
        let atual = ActiveRoleAssignment {
            role_id: cargo.id,
            role_name: cargo.name.clone(),
        };

        assert!(matches!(
            ensure_assignable(&cargo, &alvo, Some(&atual)),
            Err(AppError::RoleAlreadyAssigned { .. })
        ));
    }

    #[test]
    fn cargo_foh_exige_flag_foh_no_alvo() {
        let cargo = role(Module::Foh, "Recepcionista", false);
        let alvo = org_user(false);

        assert!(matches!(
            ensure_assignable(&cargo, &alvo, None),
            Err(AppError::FohAccessRequired)
        ));
    }

    #[test]
    fn sem_cargo_no_modulo_a_atribuicao_passa() {
        let cargo = role(Module::Admin, "Gerente", false);
        let alvo = org_user(false);

        assert!(ensure_assignable(&cargo, &alvo, None).is_ok());
    }

    #[test]
    fn auto_remocao_de_cargo_protegido_e_proibida() {
        let admin = role(Module::Admin, "Admin", true);
        let eu = Uuid::new_v4();

        assert!(matches!(
            ensure_removal_allowed(&admin, eu, eu),
            Err(AppError::SelfLockout)
        ));
    }

    #[test]
    fn remover_cargo_protegido_de_outro_usuario_e_permitido() {
        let admin = role(Module::Admin, "Admin", true);

        assert!(ensure_removal_allowed(&admin, Uuid::new_v4(), Uuid::new_v4()).is_ok());
    }

    #[test]
    fn cargo_protegido_nunca_tem_tarefa_alternada() {
        let admin = role(Module::Admin, "Admin", true);

        assert!(matches!(
            ensure_task_toggle_allowed(&admin),
            Err(AppError::ProtectedRoleImmutable)
        ));

        let comum = role(Module::Foh, "Recepcionista", false);
        assert!(ensure_task_toggle_allowed(&comum).is_ok());
    }

    #[test]
    fn slugify_normaliza_nomes() {
        assert_eq!(slugify("Gerente de Vendas"), "gerente-de-vendas");
        assert_eq!(slugify("  Admin  "), "admin");
        assert_eq!(slugify("Plano/Passe #1"), "plano-passe-1");
    }
}
