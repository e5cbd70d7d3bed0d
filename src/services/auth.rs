// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, UserRepository},
    models::{
        auth::{Claims, RegisterCompanyPayload, User},
        company::{CreateEmployeePayload, EmployeeEntry, ProfileRole},
    },
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    company_repo: CompanyRepository,
    jwt_secret: String,
    jwt_ttl_days: i64,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        company_repo: CompanyRepository,
        jwt_secret: String,
        jwt_ttl_days: i64,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, company_repo, jwt_secret, jwt_ttl_days, pool }
    }

    // bcrypt é lento de propósito: roda fora do executor async
    async fn hash_password(password: &str) -> Result<String, AppError> {
        let password_clone = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    /// Regista a empresa e o seu primeiro ADMIN. Devolve o token do admin.
    pub async fn register_company(&self, payload: &RegisterCompanyPayload) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let hashed_password = Self::hash_password(&payload.password).await?;

        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // 2. Cria o utilizador
        let admin = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                &payload.first_name,
                &payload.last_name,
            )
            .await?;

        // 3. Cria a empresa
        let company = self
            .company_repo
            .create_company(
                &mut *tx,
                &payload.company_name,
                &payload.company_email,
                payload.company_description.as_deref(),
                admin.id,
            )
            .await?;

        // 4. Perfil ADMIN ligando os dois
        self.company_repo
            .create_profile(&mut *tx, admin.id, company.id, ProfileRole::Admin, payload.job_title.as_deref())
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        tracing::info!("🏢 Empresa '{}' registada por {}", company.name, admin.username);

        self.create_token(admin.id)
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
        if !user.is_active {
            return Err(AppError::Forbidden("user_inactive"));
        }

        self.create_token(user.id)
    }

    /// Cria um funcionário (perfil EMPLOYEE) na empresa do admin chamador.
    pub async fn create_employee(
        &self,
        caller: &User,
        payload: &CreateEmployeePayload,
    ) -> Result<EmployeeEntry, AppError> {
        let profile = self
            .company_repo
            .find_profile(caller.id)
            .await?
            .ok_or(AppError::NotFound("profile_required"))?;

        if !profile.is_admin() {
            return Err(AppError::Forbidden("company_admin_required"));
        }

        let hashed_password = Self::hash_password(&payload.password).await?;

        let mut tx = self.pool.begin().await?;

        let user = self
            .user_repo
            .create_user(
                &mut *tx,
                &payload.username,
                &payload.email,
                &hashed_password,
                &payload.first_name,
                &payload.last_name,
            )
            .await?;

        let employee = self
            .company_repo
            .create_profile(
                &mut *tx,
                user.id,
                profile.company_id,
                ProfileRole::Employee,
                payload.job_title.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Funcionário {} criado na empresa {}", user.username, profile.company_id);

        Ok(EmployeeEntry {
            user_id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: employee.role,
            job_title: employee.job_title,
            is_active: employee.is_active,
        })
    }

    /// Valida o JWT e carrega o utilizador (ativo) a que ele pertence.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        encode_token(user_id, &self.jwt_secret, self.jwt_ttl_days)
    }
}

fn encode_token(user_id: Uuid, secret: &str, ttl_days: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(ttl_days);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

fn decode_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;
    Ok(token_data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_the_subject() {
        let user_id = Uuid::new_v4();
        let token = encode_token(user_id, "segredo-de-teste", 7).unwrap();
        assert_eq!(decode_token(&token, "segredo-de-teste").unwrap(), user_id);
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let token = encode_token(Uuid::new_v4(), "segredo-a", 7).unwrap();
        let err = decode_token(&token, "segredo-b").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = encode_token(Uuid::new_v4(), "segredo", -1).unwrap();
        assert!(matches!(decode_token(&token, "segredo"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_token("nao.e.jwt", "segredo"), Err(AppError::InvalidToken)));
    }
}
