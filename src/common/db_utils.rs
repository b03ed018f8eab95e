use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::tenancy::TenantScope;

// ---
// Helper RLS: A "Chave" para o Banco de Dados
// ---
/// Abre uma transação e define a variável de sessão que as policies de Row
/// Level Security usam para filtrar TODA leitura/escrita de dados de tenant
/// (alunos, planos, passes).
///
/// O valor gravado é o id do vínculo (org_user) atual — as policies resolvem
/// o org_id por subconsulta em org_users, nunca por um campo desnormalizado.
/// Sem academia selecionada, gravamos o UUID nulo: a subconsulta não encontra
/// nada e as queries passam a responder zero linhas (fail closed).
///
/// `set_config(..., true)` é local à transação: quando a transação termina, a
/// conexão volta para a pool limpa, sem vazar escopo para o próximo request.
pub(crate) async fn begin_scoped_tx(
    app_state: &AppState,
    scope: &TenantScope,
) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, AppError> {
    // 1. Abre a transação
    // O operador '?' converte automaticamente sqlx::Error -> AppError::DatabaseError
    let mut tx = app_state.db_pool.begin().await?;

    // 2. Define o vínculo atual (escopo do tenant) dentro da transação
    sqlx::query("SELECT set_config('app.org_user_id', $1, true)")
        .bind(scope.scope_key().to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
