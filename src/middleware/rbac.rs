// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantScope},
};

/// 1. O Trait que define o que é uma Tarefa exigível por rota
pub trait TaskDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
/// Colocado na assinatura do handler, verifica no banco se o vínculo atual
/// possui a tarefa — via cargo ativo com a tarefa ligada, ou via cargo
/// protegido (Admin tem capacidade total por construção, sem enumerar).
pub struct RequireTask<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequireTask<T>
where
    T: TaskDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Extrai o escopo do tenant (vínculo atual)
        let scope = parts
            .extensions
            .get::<TenantScope>()
            .cloned()
            .unwrap_or_else(TenantScope::empty);
        let org_user_id = scope.require_org_user()?;

        // C. Verifica no Banco — decisão re-derivada a cada request, sem
        // cache, para que revogações valham imediatamente
        let required_task = T::slug();
        let has_task = app_state
            .rbac_repo
            .org_user_has_task(org_user_id, scope.org_id_or_nil(), required_task)
            .await?;

        if !has_task {
            return Err(AppError::TaskRequired(required_task.to_string()));
        }

        Ok(RequireTask(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS TAREFAS (TIPOS)
// ---

pub struct TaskMembersRead;
impl TaskDef for TaskMembersRead {
    fn slug() -> &'static str { "members:read" }
}

pub struct TaskMembersWrite;
impl TaskDef for TaskMembersWrite {
    fn slug() -> &'static str { "members:write" }
}

pub struct TaskPlansRead;
impl TaskDef for TaskPlansRead {
    fn slug() -> &'static str { "plans:read" }
}

pub struct TaskPlansWrite;
impl TaskDef for TaskPlansWrite {
    fn slug() -> &'static str { "plans:write" }
}

pub struct TaskPassesWrite;
impl TaskDef for TaskPassesWrite {
    fn slug() -> &'static str { "passes:write" }
}

pub struct TaskStaffRead;
impl TaskDef for TaskStaffRead {
    fn slug() -> &'static str { "staff:read" }
}

pub struct TaskStaffWrite;
impl TaskDef for TaskStaffWrite {
    fn slug() -> &'static str { "staff:write" }
}
