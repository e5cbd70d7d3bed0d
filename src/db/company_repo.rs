// src/db/company_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::company::{Company, EmployeeEntry, Profile, ProfileRole};

/// "Quem está em que empresa, com que papel": empresas e perfis.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria a empresa (dentro da transação do registo).
    pub async fn create_company<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        description: Option<&str>,
        created_by: Uuid,
    ) -> Result<Company, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Company>(
            r#"
            INSERT INTO companies (name, email, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, description, is_active, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(description)
        .bind(created_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("companies_name_key") => AppError::Conflict("company_name_taken"),
                        _ => AppError::Conflict("company_email_taken"),
                    };
                }
            }
            e.into()
        })
    }

    pub async fn find_company(&self, id: Uuid) -> Result<Option<Company>, AppError> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, email, description, is_active, created_by, created_at
            FROM companies WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(company)
    }

    pub async fn list_active_companies(&self) -> Result<Vec<Company>, AppError> {
        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, email, description, is_active, created_by, created_at
            FROM companies
            WHERE is_active
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    /// Liga um utilizador a uma empresa (tabela-ponte profiles).
    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        company_id: Uuid,
        role: ProfileRole,
        job_title: Option<&str>,
    ) -> Result<Profile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, company_id, role, job_title)
            VALUES ($1, $2, $3, $4)
            RETURNING user_id, company_id, role, job_title, is_active, created_at
            "#,
        )
        .bind(user_id)
        .bind(company_id)
        .bind(role)
        .bind(job_title)
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }

    /// O perfil ativo do utilizador. Sem perfil = sem empresa.
    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, company_id, role, job_title, is_active, created_at
            FROM profiles
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn company_of(&self, user_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(self.find_profile(user_id).await?.map(|p| p.company_id))
    }

    pub async fn list_employees(&self, company_id: Uuid) -> Result<Vec<EmployeeEntry>, AppError> {
        let employees = sqlx::query_as::<_, EmployeeEntry>(
            r#"
            SELECT u.id AS user_id, u.username, u.email, u.first_name, u.last_name,
                   p.role, p.job_title, p.is_active
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.company_id = $1
            ORDER BY u.last_name, u.first_name, u.username
            "#,
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(employees)
    }

    /// Utilizadores ativos da empresa, excluindo `exclude` (fan-out PRIVATE).
    pub async fn active_member_ids<'e, E>(
        &self,
        executor: E,
        company_id: Uuid,
        exclude: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar(
            r#"
            SELECT p.user_id
            FROM profiles p
            JOIN users u ON u.id = p.user_id
            WHERE p.company_id = $1 AND p.is_active AND u.is_active AND p.user_id <> $2
            "#,
        )
        .bind(company_id)
        .bind(exclude)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }
}
