// src/services/group_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CompanyRepository, GroupRepository, UserRepository},
    models::group::{
        AnswerOutcome, CreateGroupPayload, Group, GroupDetail, GroupMember, GroupMemberEntry,
        IntegrationRequest, IntegrationStatus, MemberRole,
    },
};

/// Decide se a remoção de um membro mantém o grupo válido.
/// `admin_count` conta os ADMIN atuais (incluindo o alvo, se for ADMIN).
pub fn check_member_removal(
    group: &Group,
    target: &GroupMember,
    admin_count: i64,
) -> Result<(), AppError> {
    if target.user_id == group.owner_id {
        return Err(AppError::InvariantViolation("cannot_remove_owner"));
    }
    if target.role == MemberRole::Admin && admin_count <= 1 {
        return Err(AppError::InvariantViolation("cannot_remove_last_admin"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    company_repo: CompanyRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl GroupService {
    pub fn new(
        group_repo: GroupRepository,
        company_repo: CompanyRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        Self { group_repo, company_repo, user_repo, pool }
    }

    async fn load_group(&self, group_id: Uuid) -> Result<Group, AppError> {
        self.group_repo
            .find_group(&self.pool, group_id)
            .await?
            .ok_or(AppError::NotFound("group_not_found"))
    }

    async fn require_group_admin(&self, group_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        match self.group_repo.find_member(&self.pool, group_id, user_id).await? {
            Some(m) if m.role == MemberRole::Admin => Ok(()),
            _ => Err(AppError::Forbidden("group_admin_required")),
        }
    }

    /// Cria o grupo na empresa do criador, que entra como ADMIN.
    pub async fn create_group(
        &self,
        creator_id: Uuid,
        payload: &CreateGroupPayload,
    ) -> Result<Group, AppError> {
        let profile = self
            .company_repo
            .find_profile(creator_id)
            .await?
            .ok_or(AppError::NotFound("profile_required"))?;

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o grupo
        let group = self
            .group_repo
            .create_group(
                &mut *tx,
                payload.name.trim(),
                payload.description.as_deref(),
                profile.company_id,
                creator_id,
                payload.accepts_requests,
            )
            .await?;

        // 3. O criador é o primeiro ADMIN
        self.group_repo
            .add_member(&mut *tx, group.id, creator_id, MemberRole::Admin, Some(creator_id))
            .await?;

        tx.commit().await?;

        tracing::info!("👥 Grupo '{}' criado na empresa {}", group.name, group.company_id);
        Ok(group)
    }

    pub async fn list_groups(&self, user_id: Uuid) -> Result<Vec<GroupDetail>, AppError> {
        let company_id = self.company_repo.company_of(user_id).await?;
        self.group_repo.list_for_user(user_id, company_id).await
    }

    pub async fn get_group(&self, group_id: Uuid) -> Result<GroupDetail, AppError> {
        self.group_repo
            .find_group_detail(group_id)
            .await?
            .ok_or(AppError::NotFound("group_not_found"))
    }

    pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<GroupMemberEntry>, AppError> {
        self.load_group(group_id).await?;
        self.group_repo.list_members(group_id).await
    }

    pub async fn add_member(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
    ) -> Result<GroupMember, AppError> {
        self.load_group(group_id).await?;
        self.require_group_admin(group_id, actor_id).await?;

        if !self.user_repo.exists_active(user_id).await? {
            return Err(AppError::NotFound("user_not_found"));
        }

        let member = self
            .group_repo
            .add_member(&self.pool, group_id, user_id, role, Some(actor_id))
            .await?;

        tracing::info!("➕ {} adicionado ao grupo {} como {:?}", user_id, group_id, role);
        Ok(member)
    }

    /// Remove um membro. ADMIN remove qualquer um; um membro pode sair sozinho.
    pub async fn remove_member(
        &self,
        actor_id: Uuid,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let group = self.load_group(group_id).await?;
        if actor_id != user_id {
            self.require_group_admin(group_id, actor_id).await?;
        }

        let mut tx = self.pool.begin().await?;

        // Tranca os ADMIN antes de decidir (duas remoções simultâneas não esvaziam o grupo)
        let admin_count = self.group_repo.count_admins_for_update(&mut *tx, group_id).await?;

        let target = self
            .group_repo
            .find_member(&mut *tx, group_id, user_id)
            .await?
            .ok_or(AppError::NotFound("member_not_found"))?;

        check_member_removal(&group, &target, admin_count)?;

        self.group_repo.remove_member(&mut *tx, group_id, user_id).await?;
        tx.commit().await?;

        tracing::info!("➖ {} removido do grupo {}", user_id, group_id);
        Ok(())
    }

    // =========================================================================
    //  PEDIDOS DE INTEGRAÇÃO
    // =========================================================================

    pub async fn create_request(
        &self,
        requester_id: Uuid,
        group_id: Uuid,
        message: Option<&str>,
    ) -> Result<IntegrationRequest, AppError> {
        let group = self.load_group(group_id).await?;

        if !group.accepts_requests {
            return Err(AppError::InvalidInput("group_closed_to_requests"));
        }
        if self.group_repo.find_member(&self.pool, group_id, requester_id).await?.is_some() {
            return Err(AppError::Conflict("already_member"));
        }

        let request = self
            .group_repo
            .create_request(&self.pool, requester_id, group_id, message)
            .await?;

        tracing::info!("📨 Pedido de integração de {} no grupo {}", requester_id, group_id);
        Ok(request)
    }

    /// Aceita ou recusa. Quem responde: ADMIN do grupo ou ADMIN da empresa dona.
    pub async fn answer_request(
        &self,
        actor_id: Uuid,
        request_id: Uuid,
        accept: bool,
    ) -> Result<IntegrationRequest, AppError> {
        let mut tx = self.pool.begin().await?;

        let request = self
            .group_repo
            .find_request_for_update(&mut *tx, request_id)
            .await?
            .ok_or(AppError::NotFound("request_not_found"))?;

        let group = self
            .group_repo
            .find_group(&mut *tx, request.group_id)
            .await?
            .ok_or(AppError::NotFound("group_not_found"))?;

        let is_group_admin = matches!(
            self.group_repo.find_member(&mut *tx, group.id, actor_id).await?,
            Some(m) if m.role == MemberRole::Admin
        );
        let is_company_admin = self
            .company_repo
            .find_profile(actor_id)
            .await?
            .is_some_and(|p| p.is_admin_of(group.company_id));

        if !is_group_admin && !is_company_admin {
            return Err(AppError::Forbidden("group_admin_required"));
        }

        let updated = match request.status.answer(accept)? {
            AnswerOutcome::Unchanged => request,
            AnswerOutcome::Transition(status) => {
                let updated = self
                    .group_repo
                    .set_request_status(&mut *tx, request.id, status, actor_id)
                    .await?;
                if status == IntegrationStatus::Accepted {
                    self.group_repo
                        .add_member_if_absent(
                            &mut *tx,
                            group.id,
                            request.requester_id,
                            MemberRole::Invited,
                            actor_id,
                        )
                        .await?;
                }
                updated
            }
        };

        tx.commit().await?;

        tracing::info!("📬 Pedido {} respondido: {:?}", updated.id, updated.status);
        Ok(updated)
    }

    pub async fn list_requests(&self, user_id: Uuid) -> Result<Vec<IntegrationRequest>, AppError> {
        let admin_of = self
            .company_repo
            .find_profile(user_id)
            .await?
            .filter(|p| p.is_admin())
            .map(|p| p.company_id);
        self.group_repo.list_requests_for(user_id, admin_of).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn group(owner: Uuid) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "G".into(),
            description: None,
            company_id: Uuid::new_v4(),
            owner_id: owner,
            accepts_requests: false,
            created_at: Utc::now(),
        }
    }

    fn member(group: &Group, user: Uuid, role: MemberRole) -> GroupMember {
        GroupMember {
            group_id: group.id,
            user_id: user,
            role,
            added_by: None,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn owner_cannot_be_removed() {
        let owner = Uuid::new_v4();
        let g = group(owner);
        let err = check_member_removal(&g, &member(&g, owner, MemberRole::Admin), 3).unwrap_err();
        assert_eq!(err.code(), "cannot_remove_owner");
    }

    #[test]
    fn last_admin_cannot_be_removed() {
        let g = group(Uuid::new_v4());
        let admin = member(&g, Uuid::new_v4(), MemberRole::Admin);
        let err = check_member_removal(&g, &admin, 1).unwrap_err();
        assert_eq!(err.code(), "cannot_remove_last_admin");
        assert!(check_member_removal(&g, &admin, 2).is_ok());
    }

    #[test]
    fn plain_members_can_always_leave() {
        let g = group(Uuid::new_v4());
        for role in [MemberRole::Member, MemberRole::Invited] {
            assert!(check_member_removal(&g, &member(&g, Uuid::new_v4(), role), 1).is_ok());
        }
    }
}
