use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Tudo que a camada de serviço pode recusar vira uma variante aqui e é
// convertido em UMA resposta HTTP no IntoResponse abaixo — nada de erro
// interno vazando para o cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Vínculo com a academia não encontrado")]
    MembershipNotFound,

    #[error("Nenhuma academia selecionada")]
    NoOrganizationSelected,

    #[error("Cargo não encontrado")]
    RoleNotFound,

    #[error("Tarefa não encontrada")]
    TaskNotFound,

    #[error("Aluno não encontrado")]
    MemberNotFound,

    #[error("Plano não encontrado")]
    PlanNotFound,

    // Conflito da regra "um cargo por módulo": sempre nomeia o cargo que o
    // usuário já possui, para a mensagem ser acionável.
    #[error("Usuário já possui o cargo '{existing}'")]
    RoleAlreadyAssigned { existing: String },

    #[error("Cargo protegido")]
    ProtectedRoleImmutable,

    #[error("Tentativa de auto-remoção de cargo protegido")]
    SelfLockout,

    #[error("Usuário sem acesso à recepção")]
    FohAccessRequired,

    #[error("Tarefa exigida: {0}")]
    TaskRequired(String),

    #[error("Exclusivo do cargo Admin")]
    AdminRoleRequired,

    #[error("Identidade já em uso: {0}")]
    IdentityInUse(String),

    #[error("Violação de chave única: {0}")]
    UniqueConstraintViolation(String),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::RoleAlreadyAssigned { existing } => {
                let body = Json(json!({
                    "error": format!(
                        "O usuário já possui o cargo '{}' neste módulo. Remova o cargo atual antes de atribuir outro.",
                        existing
                    ),
                    "conflictingRole": existing,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::IdentityInUse(field) => {
                let body = Json(json!({
                    "error": format!("Já existe um aluno cadastrado com este {}.", field),
                    "field": field,
                }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string()),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Token de autenticação inválido ou ausente.".to_string()),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string()),
            AppError::MembershipNotFound => (StatusCode::NOT_FOUND, "Vínculo com a academia não encontrado.".to_string()),
            AppError::RoleNotFound => (StatusCode::NOT_FOUND, "Cargo não encontrado.".to_string()),
            AppError::TaskNotFound => (StatusCode::NOT_FOUND, "Tarefa não encontrada.".to_string()),
            AppError::MemberNotFound => (StatusCode::NOT_FOUND, "Aluno não encontrado.".to_string()),
            AppError::PlanNotFound => (StatusCode::NOT_FOUND, "Plano não encontrado.".to_string()),

            AppError::NoOrganizationSelected => (
                StatusCode::CONFLICT,
                "Nenhuma academia selecionada. Escolha uma academia antes de continuar.".to_string(),
            ),

            AppError::ProtectedRoleImmutable => (
                StatusCode::FORBIDDEN,
                "O conjunto de tarefas do cargo Admin é fixo e não pode ser editado.".to_string(),
            ),
            AppError::SelfLockout => (
                StatusCode::FORBIDDEN,
                "Você não pode remover o próprio cargo de administrador.".to_string(),
            ),
            AppError::FohAccessRequired => (
                StatusCode::FORBIDDEN,
                "Este usuário não possui acesso à recepção nesta academia.".to_string(),
            ),
            AppError::TaskRequired(slug) => (
                StatusCode::FORBIDDEN,
                format!("Você precisa da tarefa '{}' para realizar esta ação.", slug),
            ),
            AppError::AdminRoleRequired => (
                StatusCode::FORBIDDEN,
                "Esta visão é exclusiva de administradores.".to_string(),
            ),

            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),

            // Todos os outros erros (DatabaseError, InternalServerError...) viram 500.
            // O `tracing` loga a causa detalhada; o cliente recebe uma mensagem genérica.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.".to_string())
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
