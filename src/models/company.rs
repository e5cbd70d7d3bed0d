// src/models/company.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Mapeia o CREATE TYPE profile_role do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "profile_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProfileRole {
    Admin,
    Employee,
}

// ---
// 1. Company (a "Entreprise", fronteira do tenant)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: Uuid,
    #[schema(example = "Acme SARL")]
    pub name: String,
    pub email: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// ---
// 2. Profile (a "Ponte" Usuário-Empresa, com o cargo)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: ProfileRole,
    #[schema(example = "Responsable RH")]
    pub job_title: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role == ProfileRole::Admin
    }

    pub fn is_admin_of(&self, company_id: Uuid) -> bool {
        self.is_admin() && self.company_id == company_id
    }
}

// Linha do diretório de funcionários (users JOIN profiles)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeEntry {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: ProfileRole,
    pub job_title: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeePayload {
    #[validate(length(min = 1, max = 150, message = "required"))]
    pub username: String,
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 8, message = "password_too_short"))]
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub job_title: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: ProfileRole, company_id: Uuid) -> Profile {
        Profile {
            user_id: Uuid::new_v4(),
            company_id,
            role,
            job_title: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admin_only_of_own_company() {
        let company = Uuid::new_v4();
        let admin = profile(ProfileRole::Admin, company);
        let employee = profile(ProfileRole::Employee, company);

        assert!(admin.is_admin_of(company));
        assert!(!admin.is_admin_of(Uuid::new_v4()));
        assert!(!employee.is_admin_of(company));
    }
}
