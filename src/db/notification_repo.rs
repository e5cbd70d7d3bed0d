// src/db/notification_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::notification::{Notification, NotificationKind};

// Teto da listagem
const LIST_LIMIT: i64 = 200;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserção em lote; duplicados (artigo, utilizador, tipo) são ignorados.
    /// Devolve quantas linhas novas entraram. Ids sem utilizador são ignorados.
    pub async fn insert_many<'e, E>(
        &self,
        executor: E,
        article_id: Uuid,
        user_ids: &[Uuid],
        kind: NotificationKind,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (article_id, user_id, kind)
            SELECT $1, u.id, $3 FROM users u WHERE u.id = ANY($2)
            ON CONFLICT (article_id, user_id, kind) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_ids)
        .bind(kind)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>, AppError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT n.id, n.article_id, a.title AS article_title, a.slug AS article_slug,
                   u.username AS article_author, n.user_id, n.kind, n.is_read, n.created_at
            FROM notifications n
            JOIN articles a ON a.id = n.article_id
            JOIN users u ON u.id = a.author_id
            WHERE n.user_id = $1
            ORDER BY n.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(notifications)
    }

    pub async fn unread_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Marca uma notificação do próprio utilizador. `false` se não existir (ou for de outro).
    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
