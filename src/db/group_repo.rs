// src/db/group_repo.rs

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{map_unique_violation, AppError};
use crate::models::group::{
    Group, GroupDetail, GroupMember, GroupMemberEntry, IntegrationRequest, IntegrationStatus,
    MemberRole,
};

const GROUP_COLUMNS: &str =
    "g.id, g.name, g.description, g.company_id, g.owner_id, g.accepts_requests, g.created_at";
const REQUEST_COLUMNS: &str =
    "id, requester_id, group_id, message, status, created_at, answered_at, answered_by";
const REQUEST_COLUMNS_QUALIFIED: &str = "r.id, r.requester_id, r.group_id, r.message, r.status, \
     r.created_at, r.answered_at, r.answered_by";

#[derive(Clone)]
pub struct GroupRepository {
    pool: PgPool,
}

impl GroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  GRUPOS
    // =========================================================================

    pub async fn create_group<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        company_id: Uuid,
        owner_id: Uuid,
        accepts_requests: bool,
    ) -> Result<Group, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO chat_groups (name, description, company_id, owner_id, accepts_requests)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, company_id, owner_id, accepts_requests, created_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(company_id)
        .bind(owner_id)
        .bind(accepts_requests)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "group_name_taken"))
    }

    pub async fn find_group<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Group>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM chat_groups g WHERE g.id = $1", GROUP_COLUMNS);
        let group = sqlx::query_as::<_, Group>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(group)
    }

    pub async fn find_group_detail(&self, id: Uuid) -> Result<Option<GroupDetail>, AppError> {
        let sql = format!(
            r#"
            SELECT {},
                   (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id) AS member_count
            FROM chat_groups g
            WHERE g.id = $1
            "#,
            GROUP_COLUMNS
        );
        let detail = sqlx::query_as::<_, GroupDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    /// Grupos da minha empresa + grupos onde sou membro.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        company_id: Option<Uuid>,
    ) -> Result<Vec<GroupDetail>, AppError> {
        let sql = format!(
            r#"
            SELECT {},
                   (SELECT COUNT(*) FROM group_members m WHERE m.group_id = g.id) AS member_count
            FROM chat_groups g
            WHERE g.company_id = $2
               OR EXISTS (SELECT 1 FROM group_members m WHERE m.group_id = g.id AND m.user_id = $1)
            ORDER BY g.name
            "#,
            GROUP_COLUMNS
        );
        let groups = sqlx::query_as::<_, GroupDetail>(&sql)
            .bind(user_id)
            .bind(company_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(groups)
    }

    // =========================================================================
    //  MEMBROS
    // =========================================================================

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        added_by: Option<Uuid>,
    ) -> Result<GroupMember, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, GroupMember>(
            r#"
            INSERT INTO group_members (group_id, user_id, role, added_by)
            VALUES ($1, $2, $3, $4)
            RETURNING group_id, user_id, role, added_by, added_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .bind(added_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique_violation(e, "already_member"))
    }

    /// Insere o membro só se ainda não existir. Devolve `true` se inseriu.
    pub async fn add_member_if_absent<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        user_id: Uuid,
        role: MemberRole,
        added_by: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO group_members (group_id, user_id, role, added_by)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_id, user_id) DO NOTHING
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .bind(role)
        .bind(added_by)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn find_member<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<GroupMember>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let member = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT group_id, user_id, role, added_by, added_at
            FROM group_members
            WHERE group_id = $1 AND user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
        Ok(member)
    }

    pub async fn list_members(&self, group_id: Uuid) -> Result<Vec<GroupMemberEntry>, AppError> {
        let members = sqlx::query_as::<_, GroupMemberEntry>(
            r#"
            SELECT u.id AS user_id, u.username, u.first_name, u.last_name,
                   p.company_id, m.role, m.added_at
            FROM group_members m
            JOIN users u ON u.id = m.user_id
            LEFT JOIN profiles p ON p.user_id = m.user_id AND p.is_active
            WHERE m.group_id = $1
            ORDER BY m.added_at
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    /// Conta os ADMIN do grupo, trancando as linhas para a remoção concorrente.
    pub async fn count_admins_for_update<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let admins: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT user_id FROM group_members
            WHERE group_id = $1 AND role = 'ADMIN'
            FOR UPDATE
            "#,
        )
        .bind(group_id)
        .fetch_all(executor)
        .await?;
        Ok(admins.len() as i64)
    }

    pub async fn remove_member<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM group_members WHERE group_id = $1 AND user_id = $2")
            .bind(group_id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Todas as filiações do utilizador: group_id -> papel.
    pub async fn memberships_of(&self, user_id: Uuid) -> Result<HashMap<Uuid, MemberRole>, AppError> {
        let rows: Vec<(Uuid, MemberRole)> =
            sqlx::query_as("SELECT group_id, role FROM group_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().collect())
    }

    // =========================================================================
    //  PEDIDOS DE INTEGRAÇÃO
    // =========================================================================

    pub async fn create_request<'e, E>(
        &self,
        executor: E,
        requester_id: Uuid,
        group_id: Uuid,
        message: Option<&str>,
    ) -> Result<IntegrationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO integration_requests (requester_id, group_id, message)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        sqlx::query_as::<_, IntegrationRequest>(&sql)
            .bind(requester_id)
            .bind(group_id)
            .bind(message)
            .fetch_one(executor)
            .await
            .map_err(|e| map_unique_violation(e, "request_already_exists"))
    }

    /// Lê o pedido trancando a linha (a resposta é uma transição de estado).
    pub async fn find_request_for_update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<IntegrationRequest>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM integration_requests WHERE id = $1 FOR UPDATE",
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, IntegrationRequest>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(request)
    }

    pub async fn set_request_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: IntegrationStatus,
        answered_by: Uuid,
    ) -> Result<IntegrationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE integration_requests
            SET status = $2, answered_at = $3, answered_by = $4
            WHERE id = $1
            RETURNING {}
            "#,
            REQUEST_COLUMNS
        );
        let request = sqlx::query_as::<_, IntegrationRequest>(&sql)
            .bind(id)
            .bind(status)
            .bind(Utc::now())
            .bind(answered_by)
            .fetch_one(executor)
            .await?;
        Ok(request)
    }

    /// Pedidos que eu enviei ou que visam grupos que eu administro
    /// (ou de que a minha empresa é dona, se eu for ADMIN do perfil).
    pub async fn list_requests_for(
        &self,
        user_id: Uuid,
        admin_of_company: Option<Uuid>,
    ) -> Result<Vec<IntegrationRequest>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM integration_requests r
            WHERE r.requester_id = $1
               OR EXISTS (
                    SELECT 1 FROM group_members m
                    WHERE m.group_id = r.group_id AND m.user_id = $1 AND m.role = 'ADMIN'
               )
               OR EXISTS (
                    SELECT 1 FROM chat_groups g
                    WHERE g.id = r.group_id AND g.company_id = $2
               )
            ORDER BY r.created_at DESC
            "#,
            REQUEST_COLUMNS_QUALIFIED
        );
        let requests = sqlx::query_as::<_, IntegrationRequest>(&sql)
            .bind(user_id)
            .bind(admin_of_company)
            .fetch_all(&self.pool)
            .await?;
        Ok(requests)
    }
}
