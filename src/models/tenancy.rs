// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// 1. Organization (A "Academia")
// ---
// A conta principal: a academia/estúdio dona de todos os dados de tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. OrgUser (A "Ponte" Usuário-Academia)
// ---
// O vínculo de um usuário dentro de UMA academia. Um usuário pode ter vários
// vínculos (um por academia), mas só um deles é o "atual" da sessão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgUser {
    pub id: Uuid,
    pub org_id: Uuid,
    pub user_id: Uuid,
    // Acesso à recepção (Front-of-House)
    pub is_foh_user: bool,
    pub is_active: bool,
    pub is_archived: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. OrgMembership (Resumo para os portões de acesso)
// ---
// Uma linha por academia do usuário, com o que o middleware precisa decidir:
// a flag FOH e se o vínculo está operacional.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrgMembership {
    pub org_user_id: Uuid,
    pub org_id: Uuid,
    pub org_name: String,
    pub is_foh_user: bool,
    pub is_active: bool,
    pub is_archived: bool,
}

impl OrgMembership {
    pub fn is_operational(&self) -> bool {
        self.is_active && !self.is_archived
    }

    /// Vínculo que dá acesso à recepção desta academia
    pub fn grants_foh(&self) -> bool {
        self.is_operational() && self.is_foh_user
    }

    /// Vínculo de equipe (qualquer capacidade de staff).
    /// Um usuário sem NENHUM vínculo assim é "somente aluno" e nunca pode
    /// alcançar rotas de staff.
    pub fn grants_staff(&self) -> bool {
        self.is_operational()
    }
}
