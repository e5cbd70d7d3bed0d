// src/services/company_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CompanyRepository,
    models::{
        auth::{MeResponse, User},
        company::{Company, EmployeeEntry, Profile},
    },
};

#[derive(Clone)]
pub struct CompanyService {
    company_repo: CompanyRepository,
}

impl CompanyService {
    pub fn new(company_repo: CompanyRepository) -> Self {
        Self { company_repo }
    }

    pub async fn me(&self, user: User) -> Result<MeResponse, AppError> {
        let profile = self.company_repo.find_profile(user.id).await?;
        let company = match &profile {
            Some(p) => self.company_repo.find_company(p.company_id).await?,
            None => None,
        };
        Ok(MeResponse { user, profile, company })
    }

    /// O perfil do utilizador; sem perfil a operação não se aplica.
    pub async fn require_profile(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.company_repo
            .find_profile(user_id)
            .await?
            .ok_or(AppError::NotFound("profile_required"))
    }

    pub async fn find_profile(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        self.company_repo.find_profile(user_id).await
    }

    pub async fn list_employees(&self, caller: Uuid) -> Result<Vec<EmployeeEntry>, AppError> {
        let profile = self.require_profile(caller).await?;
        self.company_repo.list_employees(profile.company_id).await
    }

    pub async fn list_companies(&self) -> Result<Vec<Company>, AppError> {
        self.company_repo.list_active_companies().await
    }

    pub async fn get_company(&self, id: Uuid) -> Result<Company, AppError> {
        self.company_repo
            .find_company(id)
            .await?
            .ok_or(AppError::NotFound("company_not_found"))
    }
}
