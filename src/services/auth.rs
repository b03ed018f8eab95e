// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, pois não toca no banco — e fora do
        // executor async, porque bcrypt é CPU-bound)
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Cria o usuário dentro de uma transação
        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(&mut *tx, email, &hashed_password, full_name)
            .await?;

        tx.commit().await?;

        // 3. Gera o token
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_claims(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

/// Decodifica e valida o JWT, separado do acesso a banco para ser testável.
fn decode_claims(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &validation,
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_for(user_id: Uuid, secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: user_id,
            exp: exp as usize,
            iat: Utc::now().timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap()
    }

    #[test]
    fn token_valido_devolve_o_sujeito() {
        let user_id = Uuid::new_v4();
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = token_for(user_id, "segredo-de-teste", exp);

        let claims = decode_claims(&token, "segredo-de-teste").unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn token_com_segredo_errado_e_rejeitado() {
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        let token = token_for(Uuid::new_v4(), "segredo-a", exp);

        assert!(matches!(
            decode_claims(&token, "segredo-b"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_expirado_e_rejeitado() {
        let exp = (Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = token_for(Uuid::new_v4(), "segredo-de-teste", exp);

        assert!(matches!(
            decode_claims(&token, "segredo-de-teste"),
            Err(AppError::InvalidToken)
        ));
    }
}
