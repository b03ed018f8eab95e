// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
};

// ---
// O Escopo de Tenant
// ---
// Resolvido UMA vez por request, a partir do vínculo atual do usuário
// (users.current_org_user_id -> org_users). Tudo que lê dado de tenant
// depende deste valor.
//
// Regra de ouro: ausência de academia selecionada NÃO é erro e NUNCA vira
// "enxerga tudo". Um escopo vazio produz um predicado que não casa com
// nenhuma linha.
#[derive(Debug, Clone)]
pub struct TenantScope {
    org_user_id: Option<Uuid>,
    org_id: Option<Uuid>,
}

impl TenantScope {
    pub fn new(org_user_id: Uuid, org_id: Uuid) -> Self {
        Self {
            org_user_id: Some(org_user_id),
            org_id: Some(org_id),
        }
    }

    /// Escopo sem academia: casa com zero linhas em qualquer consulta.
    pub fn empty() -> Self {
        Self {
            org_user_id: None,
            org_id: None,
        }
    }

    /// A "chave" gravada na sessão do banco para as policies de RLS.
    /// O UUID nulo nunca identifica um org_user real, então um escopo vazio
    /// resolve para zero linhas — fail closed, nunca wildcard.
    pub fn scope_key(&self) -> Uuid {
        self.org_user_id.unwrap_or(Uuid::nil())
    }

    /// Predicado de aplicação: org_id para o `WHERE org_id = $n` que toda
    /// query de repositório carrega, além do RLS.
    pub fn org_id_or_nil(&self) -> Uuid {
        self.org_id.unwrap_or(Uuid::nil())
    }

    /// Para operações que exigem uma academia selecionada (mutações).
    pub fn require_org(&self) -> Result<Uuid, AppError> {
        self.org_id.ok_or(AppError::NoOrganizationSelected)
    }

    pub fn require_org_user(&self) -> Result<Uuid, AppError> {
        self.org_user_id.ok_or(AppError::NoOrganizationSelected)
    }
}

// ---
// O Guard (camada de middleware)
// ---
// Roda DEPOIS do auth_guard: pega o usuário autenticado, resolve o vínculo
// atual no banco (ativo, não arquivado, não excluído) e injeta o escopo nos
// extensions. Se não houver vínculo utilizável, injeta o escopo vazio.
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    // A resolução passa pela relação org_users -> organizations, e só aceita
    // vínculos operacionais. Ponteiro obsoleto/forjado cai no escopo vazio.
    let scope = match app_state
        .tenancy_service
        .current_membership(&user.0)
        .await?
    {
        Some(org_user) => TenantScope::new(org_user.id, org_user.org_id),
        None => TenantScope::empty(),
    };

    request.extensions_mut().insert(scope);
    Ok(next.run(request).await)
}

// Extrator para os handlers.
// Um request que não passou pelo tenant_guard recebe o escopo vazio — a
// opção segura: nenhuma linha de tenant visível.
impl<S> FromRequestParts<S> for TenantScope
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<TenantScope>()
            .cloned()
            .unwrap_or_else(TenantScope::empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escopo_vazio_resolve_para_uuid_nulo() {
        let scope = TenantScope::empty();
        assert_eq!(scope.scope_key(), Uuid::nil());
        assert_eq!(scope.org_id_or_nil(), Uuid::nil());
    }

    #[test]
    fn escopo_vazio_nao_libera_operacoes_de_academia() {
        let scope = TenantScope::empty();
        assert!(matches!(
            scope.require_org(),
            Err(AppError::NoOrganizationSelected)
        ));
        assert!(matches!(
            scope.require_org_user(),
            Err(AppError::NoOrganizationSelected)
        ));
    }

    #[test]
    fn escopo_preenchido_expoe_as_chaves_do_vinculo() {
        let org_user = Uuid::new_v4();
        let org = Uuid::new_v4();
        let scope = TenantScope::new(org_user, org);

        assert_eq!(scope.scope_key(), org_user);
        assert_eq!(scope.org_id_or_nil(), org);
        assert_eq!(scope.require_org().unwrap(), org);
    }
}
