// src/models/members.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// MemberStatus (O ciclo de vida do aluno)
// ---
// Um estado explícito em vez de combinações de flags/timestamps soltos.
// A política de reserva de identidade vira um único match exaustivo:
//   - Active:   identidade em uso, bloqueia reuso
//   - Deleted:  excluído, mas a identidade CONTINUA reservada (evita que um
//               recadastro herde o histórico de outra pessoa)
//   - Archived: liberado para reuso
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "member_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberStatus {
    Active,
    Deleted,
    Archived,
}

impl MemberStatus {
    /// O e-mail/telefone/nome deste aluno ainda bloqueia um novo cadastro?
    pub fn blocks_identity_reuse(&self) -> bool {
        match self {
            MemberStatus::Active => true,
            MemberStatus::Deleted => true,
            MemberStatus::Archived => false,
        }
    }
}

// O aluno vindo do banco
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: Uuid,

    #[schema(ignore)]
    pub org_id: Uuid,

    #[schema(example = "João Pereira")]
    pub full_name: String,

    #[schema(example = "joao@gmail.com")]
    pub email: Option<String>,

    #[schema(example = "+55 11 91234-5678")]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,

    pub status: MemberStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Payload de cadastro de aluno
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "João Pereira")]
    pub full_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aluno_excluido_continua_reservando_identidade() {
        assert!(MemberStatus::Deleted.blocks_identity_reuse());
    }

    #[test]
    fn aluno_arquivado_libera_identidade() {
        assert!(!MemberStatus::Archived.blocks_identity_reuse());
    }

    #[test]
    fn aluno_ativo_bloqueia_identidade() {
        assert!(MemberStatus::Active.blocks_identity_reuse());
    }
}
