// src/middleware/access.rs

use axum::{
    extract::State,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::OrgMembership,
};

// Destinos de redirecionamento do frontend
pub const STAFF_LOGIN_ROUTE: &str = "/login";
pub const MEMBER_LOGIN_ROUTE: &str = "/portal/login";
pub const ORG_SELECTION_ROUTE: &str = "/selecionar-academia";

// Rotas que passam direto pelos portões: login/logout, seleção de academia
// e links públicos de assinatura.
const ACCESS_ALLOWLIST: &[&str] = &[
    "/api/auth/login",
    "/api/auth/logout",
    "/api/auth/register",
    "/api/orgs",
    "/api/orgs/select",
    "/api/public/signature",
];

fn is_allowlisted(path: &str) -> bool {
    ACCESS_ALLOWLIST
        .iter()
        .any(|allowed| path == *allowed || path.starts_with(&format!("{}/", allowed)))
}

// ---
// A máquina de estados do portão de acesso
// ---
// Cada request termina em exatamente um destes estados. A função é pura de
// propósito: a decisão não toca banco nem estado global, só olha os vínculos
// já carregados — o que a torna testável linha a linha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Segue para o handler.
    Allow,
    /// Sem usuário autenticado: volta para o login da equipe.
    RedirectToLogin,
    /// Sem acesso NA ACADEMIA ATUAL, mas com acesso em outra: manda escolher
    /// academia em vez de negar (falha recuperável pelo próprio usuário).
    RedirectToOrgSelection,
    /// Sem acesso em academia nenhuma: derruba a sessão com explicação.
    /// Problema de configuração de conta, não erro transitório.
    ForceLogout {
        target: &'static str,
        reason: &'static str,
    },
}

impl AccessDecision {
    fn into_redirect(self) -> Response {
        match self {
            AccessDecision::Allow => unreachable!("Allow não vira redirect"),
            AccessDecision::RedirectToLogin => Redirect::to(STAFF_LOGIN_ROUTE).into_response(),
            AccessDecision::RedirectToOrgSelection => {
                Redirect::to(ORG_SELECTION_ROUTE).into_response()
            }
            AccessDecision::ForceLogout { target, reason } => {
                Redirect::to(&format!("{}?erro={}", target, reason)).into_response()
            }
        }
    }
}

/// Portão FOH (recepção), avaliado por request:
///
/// 1. rota na allowlist       -> Allow
/// 2. sem autenticação        -> RedirectToLogin
/// 3. vínculo atual com FOH   -> Allow
/// 4. FOH em OUTRA academia   -> RedirectToOrgSelection
/// 5. FOH em lugar nenhum     -> ForceLogout (login da equipe)
pub fn evaluate_foh_access(
    path: &str,
    authenticated: bool,
    current_org_user_id: Option<Uuid>,
    memberships: &[OrgMembership],
) -> AccessDecision {
    if is_allowlisted(path) {
        return AccessDecision::Allow;
    }

    if !authenticated {
        return AccessDecision::RedirectToLogin;
    }

    let current = current_org_user_id
        .and_then(|id| memberships.iter().find(|m| m.org_user_id == id));

    if current.is_some_and(|m| m.grants_foh()) {
        return AccessDecision::Allow;
    }

    let has_foh_elsewhere = memberships
        .iter()
        .filter(|m| Some(m.org_user_id) != current_org_user_id)
        .any(|m| m.grants_foh());

    if has_foh_elsewhere {
        return AccessDecision::RedirectToOrgSelection;
    }

    AccessDecision::ForceLogout {
        target: STAFF_LOGIN_ROUTE,
        reason: "sem-acesso-recepcao",
    }
}

/// Portão de segregação aluno/equipe: um usuário "somente aluno" (nenhum
/// vínculo de equipe operacional em academia alguma) nunca alcança rotas de
/// staff — cai no login do portal do aluno, que é distinto do login da
/// equipe.
pub fn evaluate_staff_access(
    path: &str,
    authenticated: bool,
    memberships: &[OrgMembership],
) -> AccessDecision {
    if is_allowlisted(path) {
        return AccessDecision::Allow;
    }

    if !authenticated {
        return AccessDecision::RedirectToLogin;
    }

    if memberships.iter().any(|m| m.grants_staff()) {
        return AccessDecision::Allow;
    }

    AccessDecision::ForceLogout {
        target: MEMBER_LOGIN_ROUTE,
        reason: "area-exclusiva-da-equipe",
    }
}

// ---
// As camadas de middleware
// ---

pub async fn foh_guard(
    State(app_state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_owned();
    let user = request.extensions().get::<AuthenticatedUser>().cloned();

    let (authenticated, current, memberships) = match &user {
        Some(u) => (
            true,
            u.0.current_org_user_id,
            app_state.org_repo.list_memberships(u.0.id).await?,
        ),
        None => (false, None, Vec::new()),
    };

    match evaluate_foh_access(&path, authenticated, current, &memberships) {
        AccessDecision::Allow => Ok(next.run(request).await),
        decision => Ok(decision.into_redirect()),
    }
}

pub async fn staff_guard(
    State(app_state): State<AppState>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_owned();
    let user = request.extensions().get::<AuthenticatedUser>().cloned();

    let (authenticated, memberships) = match &user {
        Some(u) => (true, app_state.org_repo.list_memberships(u.0.id).await?),
        None => (false, Vec::new()),
    };

    match evaluate_staff_access(&path, authenticated, &memberships) {
        AccessDecision::Allow => Ok(next.run(request).await),
        decision => Ok(decision.into_redirect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn membership(foh: bool, active: bool, archived: bool) -> OrgMembership {
        OrgMembership {
            org_user_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            org_name: "Academia Central".to_string(),
            is_foh_user: foh,
            is_active: active,
            is_archived: archived,
        }
    }

    #[test]
    fn rota_na_allowlist_passa_sem_autenticacao() {
        let decision = evaluate_foh_access("/api/auth/login", false, None, &[]);
        assert_eq!(decision, AccessDecision::Allow);

        // Links públicos de assinatura casam por prefixo
        let decision = evaluate_foh_access("/api/public/signature/abc123", false, None, &[]);
        assert_eq!(decision, AccessDecision::Allow);
    }

    #[test]
    fn sem_autenticacao_redireciona_para_login() {
        let decision = evaluate_foh_access("/api/members", false, None, &[]);
        assert_eq!(decision, AccessDecision::RedirectToLogin);
    }

    #[test]
    fn foh_no_vinculo_atual_libera() {
        let m = membership(true, true, false);
        let decision = evaluate_foh_access("/api/members", true, Some(m.org_user_id), &[m]);
        assert_eq!(decision, AccessDecision::Allow);
    }

    #[test]
    fn foh_apenas_em_outra_academia_manda_escolher_academia() {
        // Cenário: FOH desligado na academia atual (A), ligado na academia B.
        // Tem que cair na seleção de academia — nem login, nem acesso direto.
        let atual = membership(false, true, false);
        let outra = membership(true, true, false);
        let decision = evaluate_foh_access(
            "/api/members",
            true,
            Some(atual.org_user_id),
            &[atual.clone(), outra.clone()],
        );
        assert_eq!(decision, AccessDecision::RedirectToOrgSelection);

        // Depois de trocar a academia atual para B, a mesma rota libera.
        let decision = evaluate_foh_access(
            "/api/members",
            true,
            Some(outra.org_user_id),
            &[atual, outra],
        );
        assert_eq!(decision, AccessDecision::Allow);
    }

    #[test]
    fn sem_foh_em_lugar_nenhum_derruba_a_sessao() {
        let a = membership(false, true, false);
        let b = membership(false, true, false);
        let decision =
            evaluate_foh_access("/api/members", true, Some(a.org_user_id), &[a, b]);
        assert_eq!(
            decision,
            AccessDecision::ForceLogout {
                target: STAFF_LOGIN_ROUTE,
                reason: "sem-acesso-recepcao",
            }
        );
    }

    #[test]
    fn vinculo_foh_arquivado_nao_conta() {
        // FOH ligado mas vínculo arquivado: não libera nem vale como
        // "acesso em outra academia".
        let m = membership(true, true, true);
        let decision = evaluate_foh_access("/api/members", true, Some(m.org_user_id), &[m]);
        assert!(matches!(decision, AccessDecision::ForceLogout { .. }));
    }

    #[test]
    fn somente_aluno_cai_no_login_do_portal() {
        let decision = evaluate_staff_access("/api/members", true, &[]);
        assert_eq!(
            decision,
            AccessDecision::ForceLogout {
                target: MEMBER_LOGIN_ROUTE,
                reason: "area-exclusiva-da-equipe",
            }
        );
    }

    #[test]
    fn qualquer_vinculo_de_equipe_operacional_passa_no_portao_de_staff() {
        let m = membership(false, true, false);
        let decision = evaluate_staff_access("/api/members", true, &[m]);
        assert_eq!(decision, AccessDecision::Allow);
    }

    #[test]
    fn vinculo_inativo_nao_passa_no_portao_de_staff() {
        let m = membership(true, false, false);
        let decision = evaluate_staff_access("/api/members", true, &[m]);
        assert!(matches!(decision, AccessDecision::ForceLogout { .. }));
    }
}
