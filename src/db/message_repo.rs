// src/db/message_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::messaging::{DirectConversation, Message, MessageTarget};

// Mensagem + remetente. `m` tem de ser a tabela (ou CTE) de mensagens.
const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.sender_id, u.username AS sender_username, p.company_id AS sender_company_id,
           m.kind, m.content, m.group_id, m.recipient_id, m.is_read, m.is_edited,
           m.sent_at, m.edited_at
"#;
const MESSAGE_JOINS: &str = r#"
    JOIN users u ON u.id = m.sender_id
    LEFT JOIN profiles p ON p.user_id = m.sender_id AND p.is_active
"#;

// Teto das listagens gerais
const LIST_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_message<'e, E>(
        &self,
        executor: E,
        sender_id: Uuid,
        target: MessageTarget,
        content: &str,
    ) -> Result<Message, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH m AS (
                INSERT INTO messages (sender_id, kind, content, group_id, recipient_id)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            {} FROM m {}
            "#,
            MESSAGE_SELECT, MESSAGE_JOINS
        );
        let message = sqlx::query_as::<_, Message>(&sql)
            .bind(sender_id)
            .bind(target.kind())
            .bind(content)
            .bind(target.group_id())
            .bind(target.recipient_id())
            .fetch_one(executor)
            .await?;
        Ok(message)
    }

    pub async fn find_message(&self, id: Uuid) -> Result<Option<Message>, AppError> {
        let sql = format!("{} FROM messages m {} WHERE m.id = $1", MESSAGE_SELECT, MESSAGE_JOINS);
        let message = sqlx::query_as::<_, Message>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(message)
    }

    /// Candidatas para "as minhas mensagens": diretas onde participo e
    /// mensagens dos grupos onde sou membro. O filtro fino fica com o resolver.
    pub async fn list_candidates_for(&self, user_id: Uuid) -> Result<Vec<Message>, AppError> {
        let sql = format!(
            r#"
            {} FROM messages m {}
            WHERE (m.kind = 'DIRECT' AND (m.sender_id = $1 OR m.recipient_id = $1))
               OR (m.kind <> 'DIRECT' AND EXISTS (
                    SELECT 1 FROM group_members gm
                    WHERE gm.group_id = m.group_id AND gm.user_id = $1
               ))
            ORDER BY m.sent_at DESC
            LIMIT $2
            "#,
            MESSAGE_SELECT, MESSAGE_JOINS
        );
        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(user_id)
            .bind(LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    /// As `LIST_LIMIT` mais recentes do grupo, em ordem cronológica.
    pub async fn list_group_messages(&self, group_id: Uuid) -> Result<Vec<Message>, AppError> {
        let sql = format!(
            r#"
            SELECT * FROM (
                {} FROM messages m {}
                WHERE m.group_id = $1
                ORDER BY m.sent_at DESC
                LIMIT $2
            ) recent
            ORDER BY recent.sent_at
            "#,
            MESSAGE_SELECT, MESSAGE_JOINS
        );
        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(group_id)
            .bind(LIST_LIMIT)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    /// Mensagens diretas entre dois utilizadores, nos dois sentidos.
    /// `limit = None` devolve a conversa inteira em ordem cronológica;
    /// com limite devolve as mais recentes primeiro.
    pub async fn list_direct_between(
        &self,
        a: Uuid,
        b: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, AppError> {
        let order = if limit.is_some() { "DESC" } else { "ASC" };
        let sql = format!(
            r#"
            {} FROM messages m {}
            WHERE m.kind = 'DIRECT'
              AND ((m.sender_id = $1 AND m.recipient_id = $2)
                OR (m.sender_id = $2 AND m.recipient_id = $1))
            ORDER BY m.sent_at {}
            LIMIT $3
            "#,
            MESSAGE_SELECT, MESSAGE_JOINS, order
        );
        let messages = sqlx::query_as::<_, Message>(&sql)
            .bind(a)
            .bind(b)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(messages)
    }

    pub async fn mark_read(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE messages SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // =========================================================================
    //  CONVERSAS DIRETAS
    // =========================================================================

    /// Cria ou "toca" a conversa do par canónico (user_a < user_b).
    pub async fn touch_conversation<'e, E>(
        &self,
        executor: E,
        user_a: Uuid,
        user_b: Uuid,
    ) -> Result<DirectConversation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conversation = sqlx::query_as::<_, DirectConversation>(
            r#"
            INSERT INTO direct_conversations (user_a, user_b)
            VALUES ($1, $2)
            ON CONFLICT (user_a, user_b) DO UPDATE SET last_activity = now()
            RETURNING id, user_a, user_b, created_at, last_activity
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_one(executor)
        .await?;
        Ok(conversation)
    }

    pub async fn list_conversations(&self, user_id: Uuid) -> Result<Vec<DirectConversation>, AppError> {
        let conversations = sqlx::query_as::<_, DirectConversation>(
            r#"
            SELECT id, user_a, user_b, created_at, last_activity
            FROM direct_conversations
            WHERE user_a = $1 OR user_b = $1
            ORDER BY last_activity DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(conversations)
    }
}
