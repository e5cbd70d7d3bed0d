// src/db/article_repo.rs

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{map_unique_violation, AppError};
use crate::models::news::{
    Article, ArticleAudience, ArticleFilter, ArticleStatus, ArticleVisibility, Category, Comment, Media, NewMedia,
    Tag,
};

// `a` = artigos (tabela ou CTE), `u` = autor
const ARTICLE_COLUMNS: &str = r#"
    a.id, a.title, a.slug, a.summary, a.content, a.author_id, u.username AS author_username,
    a.company_id, a.category_id, a.status, a.visibility, a.publish_date, a.expiry_date,
    a.is_pinned, a.comments_enabled, a.notifications_enabled, a.views, a.likes,
    a.created_at, a.updated_at
"#;

// Regras de visibilidade em SQL. $1 = user_id do leitor (NULL se anónimo),
// $2 = empresa do leitor (NULL se não tiver perfil), $3 = agora.
const VISIBLE_TO_VIEWER: &str = r#"
    (a.author_id = $1
     OR (a.status = 'PUBLISHED'
         AND a.publish_date <= $3
         AND (a.expiry_date IS NULL OR a.expiry_date > $3)
         AND (a.visibility = 'PUBLIC'
              OR (a.visibility = 'PRIVATE' AND a.company_id = $2)
              OR (a.visibility = 'GROUP' AND (
                    a.company_id = $2
                    OR EXISTS (
                        SELECT 1 FROM article_groups ag
                        JOIN group_members gm ON gm.group_id = ag.group_id
                        WHERE ag.article_id = a.id AND gm.user_id = $1)))
              OR (a.visibility = 'PARTNERS' AND (
                    a.company_id = $2
                    OR EXISTS (
                        SELECT 1 FROM chat_groups g
                        JOIN group_members gm ON gm.group_id = g.id
                        JOIN profiles pp ON pp.user_id = gm.user_id AND pp.is_active
                        WHERE g.company_id = a.company_id AND pp.company_id = $2)))))
    )
"#;

const MEDIA_COLUMNS: &str = r#"
    id, article_id, kind, storage_path, url, name, title, description, position, is_main,
    file_size, content_type, duration, thumbnail_path, thumbnail_url, uploaded_by, created_at
"#;

const COMMENT_COLUMNS: &str = r#"
    c.id, c.article_id, c.author_id, u.username AS author_username, c.content, c.parent_id,
    c.is_moderated, c.is_flagged, c.created_at, c.updated_at
"#;

/// Campos gravados no INSERT/UPDATE de um artigo.
#[derive(Debug, Clone)]
pub struct ArticleFields {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category_id: Option<Uuid>,
    pub status: ArticleStatus,
    pub visibility: ArticleVisibility,
    pub publish_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub comments_enabled: bool,
    pub notifications_enabled: bool,
}

fn map_article_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.constraint() == Some("articles_expiry_check") {
            return AppError::InvalidInput("expiry_before_publish");
        }
        if db_err.is_foreign_key_violation() && db_err.constraint() == Some("articles_category_id_fkey") {
            return AppError::NotFound("category_not_found");
        }
    }
    map_unique_violation(e, "article_slug_taken")
}

#[derive(Clone)]
pub struct ArticleRepository {
    pool: PgPool,
}

impl ArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  ARTIGOS
    // =========================================================================

    /// Slugs já ocupados com esta base (`base` e `base-N`).
    pub async fn taken_slugs<'e, E>(&self, executor: E, base: &str) -> Result<HashSet<String>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pattern = format!("{}-%", base.replace('_', "\\_"));
        let slugs: Vec<String> =
            sqlx::query_scalar("SELECT slug FROM articles WHERE slug = $1 OR slug LIKE $2")
                .bind(base)
                .bind(pattern)
                .fetch_all(executor)
                .await?;
        Ok(slugs.into_iter().collect())
    }

    pub async fn insert_article<'e, E>(
        &self,
        executor: E,
        fields: &ArticleFields,
        slug: &str,
        author_id: Uuid,
        company_id: Uuid,
    ) -> Result<Article, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH a AS (
                INSERT INTO articles (
                    title, slug, summary, content, author_id, company_id, category_id,
                    status, visibility, publish_date, expiry_date, is_pinned,
                    comments_enabled, notifications_enabled
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                RETURNING *
            )
            SELECT {} FROM a JOIN users u ON u.id = a.author_id
            "#,
            ARTICLE_COLUMNS
        );
        sqlx::query_as::<_, Article>(&sql)
            .bind(&fields.title)
            .bind(slug)
            .bind(&fields.summary)
            .bind(&fields.content)
            .bind(author_id)
            .bind(company_id)
            .bind(fields.category_id)
            .bind(fields.status)
            .bind(fields.visibility)
            .bind(fields.publish_date)
            .bind(fields.expiry_date)
            .bind(fields.is_pinned)
            .bind(fields.comments_enabled)
            .bind(fields.notifications_enabled)
            .fetch_one(executor)
            .await
            .map_err(map_article_write_error)
    }

    pub async fn update_article<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ArticleFields,
    ) -> Result<Article, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH a AS (
                UPDATE articles SET
                    title = $2, summary = $3, content = $4, category_id = $5, status = $6,
                    visibility = $7, publish_date = $8, expiry_date = $9, is_pinned = $10,
                    comments_enabled = $11, notifications_enabled = $12, updated_at = now()
                WHERE id = $1
                RETURNING *
            )
            SELECT {} FROM a JOIN users u ON u.id = a.author_id
            "#,
            ARTICLE_COLUMNS
        );
        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .bind(&fields.title)
            .bind(&fields.summary)
            .bind(&fields.content)
            .bind(fields.category_id)
            .bind(fields.status)
            .bind(fields.visibility)
            .bind(fields.publish_date)
            .bind(fields.expiry_date)
            .bind(fields.is_pinned)
            .bind(fields.comments_enabled)
            .bind(fields.notifications_enabled)
            .fetch_one(executor)
            .await
            .map_err(map_article_write_error)
    }

    pub async fn delete_article<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn find_article<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Article>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM articles a JOIN users u ON u.id = a.author_id WHERE a.id = $1",
            ARTICLE_COLUMNS
        );
        let article = sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(article)
    }

    /// Feed filtrado e paginado, já restrito ao que o leitor pode ver.
    pub async fn list_visible(
        &self,
        viewer: Option<Uuid>,
        viewer_company: Option<Uuid>,
        filter: &ArticleFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<Article>, AppError> {
        let (_, limit, offset) = filter.pagination();
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let sql = format!(
            r#"
            SELECT {} FROM articles a JOIN users u ON u.id = a.author_id
            WHERE {}
              AND ($4::article_status IS NULL OR a.status = $4)
              AND ($5::article_visibility IS NULL OR a.visibility = $5)
              AND ($6::uuid IS NULL OR a.category_id = $6)
              AND ($7::boolean IS NULL OR a.is_pinned = $7)
              AND ($8::text IS NULL OR a.title ILIKE $8 OR a.summary ILIKE $8 OR a.content ILIKE $8)
              AND ($9::timestamptz IS NULL OR a.publish_date >= $9)
              AND ($10::timestamptz IS NULL OR a.publish_date <= $10)
            ORDER BY a.is_pinned DESC, a.publish_date DESC
            LIMIT $11 OFFSET $12
            "#,
            ARTICLE_COLUMNS, VISIBLE_TO_VIEWER
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(viewer)
            .bind(viewer_company)
            .bind(now)
            .bind(filter.status)
            .bind(filter.visibility)
            .bind(filter.category)
            .bind(filter.pinned)
            .bind(search)
            .bind(filter.from)
            .bind(filter.to)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    pub async fn list_by_author(&self, author_id: Uuid) -> Result<Vec<Article>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM articles a JOIN users u ON u.id = a.author_id
            WHERE a.author_id = $1
            ORDER BY a.created_at DESC
            "#,
            ARTICLE_COLUMNS
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    /// Os mais vistos (depois mais curtidos) publicados desde `since`.
    pub async fn popular(
        &self,
        viewer: Option<Uuid>,
        viewer_company: Option<Uuid>,
        since: DateTime<Utc>,
        now: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<Article>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM articles a JOIN users u ON u.id = a.author_id
            WHERE {}
              AND a.status = 'PUBLISHED'
              AND a.publish_date >= $4
            ORDER BY a.views DESC, a.likes DESC
            LIMIT $5
            "#,
            ARTICLE_COLUMNS, VISIBLE_TO_VIEWER
        );
        let articles = sqlx::query_as::<_, Article>(&sql)
            .bind(viewer)
            .bind(viewer_company)
            .bind(now)
            .bind(since)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(articles)
    }

    /// Relação do leitor com o artigo para GROUP/PARTNERS.
    pub async fn audience(
        &self,
        article_id: Uuid,
        article_company: Uuid,
        viewer: Uuid,
        viewer_company: Option<Uuid>,
    ) -> Result<ArticleAudience, AppError> {
        let (in_target_group, is_partner): (bool, bool) = sqlx::query_as(
            r#"
            SELECT
                EXISTS (
                    SELECT 1 FROM article_groups ag
                    JOIN group_members gm ON gm.group_id = ag.group_id
                    WHERE ag.article_id = $1 AND gm.user_id = $3
                ),
                EXISTS (
                    SELECT 1 FROM chat_groups g
                    JOIN group_members gm ON gm.group_id = g.id
                    JOIN profiles pp ON pp.user_id = gm.user_id AND pp.is_active
                    WHERE g.company_id = $2 AND pp.company_id = $4
                )
            "#,
        )
        .bind(article_id)
        .bind(article_company)
        .bind(viewer)
        .bind(viewer_company)
        .fetch_one(&self.pool)
        .await?;
        Ok(ArticleAudience { in_target_group, is_partner })
    }

    // =========================================================================
    //  TAGS E GRUPOS-ALVO DO ARTIGO
    // =========================================================================

    pub async fn replace_tags(
        &self,
        tx: &mut sqlx::PgConnection,
        article_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM article_tags WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO article_tags (article_id, tag_id)
            SELECT $1, t FROM UNNEST($2::uuid[]) AS t
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(tag_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("tag_not_found")
            }
            _ => e.into(),
        })?;
        Ok(())
    }

    pub async fn replace_groups(
        &self,
        tx: &mut sqlx::PgConnection,
        article_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<(), AppError> {
        sqlx::query("DELETE FROM article_groups WHERE article_id = $1")
            .bind(article_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            INSERT INTO article_groups (article_id, group_id)
            SELECT $1, g FROM UNNEST($2::uuid[]) AS g
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(group_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                AppError::NotFound("group_not_found")
            }
            _ => e.into(),
        })?;
        Ok(())
    }

    pub async fn tags_of(&self, article_id: Uuid) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>(
            r#"
            SELECT t.id, t.name, t.color
            FROM news_tags t
            JOIN article_tags at ON at.tag_id = t.id
            WHERE at.article_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tags)
    }

    pub async fn group_ids_of(&self, article_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar("SELECT group_id FROM article_groups WHERE article_id = $1")
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }

    // =========================================================================
    //  VISUALIZAÇÕES E LIKES
    // =========================================================================

    /// Regista a visualização (uma por utilizador). O contador só sobe na primeira.
    pub async fn record_view(
        &self,
        tx: &mut sqlx::PgConnection,
        article_id: Uuid,
        user_id: Uuid,
        ip_address: Option<&str>,
        user_agent: &str,
    ) -> Result<bool, AppError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO article_views (article_id, user_id, ip_address, user_agent)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (article_id, user_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .bind(ip_address)
        .bind(user_agent)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        if inserted {
            sqlx::query("UPDATE articles SET views = views + 1 WHERE id = $1")
                .bind(article_id)
                .execute(&mut *tx)
                .await?;
        }
        Ok(inserted)
    }

    pub async fn is_liked(&self, article_id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
        let liked: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM article_likes WHERE article_id = $1 AND user_id = $2)",
        )
        .bind(article_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(liked)
    }

    /// Liga/desliga o like. Devolve (curtido agora?, total de likes).
    pub async fn toggle_like(
        &self,
        tx: &mut sqlx::PgConnection,
        article_id: Uuid,
        user_id: Uuid,
    ) -> Result<(bool, i32), AppError> {
        let removed = sqlx::query("DELETE FROM article_likes WHERE article_id = $1 AND user_id = $2")
            .bind(article_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            == 1;

        if removed {
            let likes: i32 = sqlx::query_scalar(
                "UPDATE articles SET likes = GREATEST(likes - 1, 0) WHERE id = $1 RETURNING likes",
            )
            .bind(article_id)
            .fetch_one(&mut *tx)
            .await?;
            return Ok((false, likes));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO article_likes (article_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (article_id, user_id) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected()
            == 1;

        let likes: i32 = if inserted {
            sqlx::query_scalar("UPDATE articles SET likes = likes + 1 WHERE id = $1 RETURNING likes")
                .bind(article_id)
                .fetch_one(&mut *tx)
                .await?
        } else {
            // Um pedido concorrente já inseriu o like
            sqlx::query_scalar("SELECT likes FROM articles WHERE id = $1")
                .bind(article_id)
                .fetch_one(&mut *tx)
                .await?
        };
        Ok((true, likes))
    }

    // =========================================================================
    //  COMENTÁRIOS
    // =========================================================================

    pub async fn insert_comment<'e, E>(
        &self,
        executor: E,
        article_id: Uuid,
        author_id: Uuid,
        content: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            WITH c AS (
                INSERT INTO article_comments (article_id, author_id, content, parent_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT {} FROM c JOIN users u ON u.id = c.author_id
            "#,
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .bind(author_id)
            .bind(content)
            .bind(parent_id)
            .fetch_one(executor)
            .await
            .map_err(|e| match &e {
                // O FK composto (parent_id, article_id) garante o mesmo artigo
                sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                    AppError::InvalidInput("parent_comment_mismatch")
                }
                _ => e.into(),
            })
    }

    pub async fn find_comment(&self, id: Uuid) -> Result<Option<Comment>, AppError> {
        let sql = format!(
            "SELECT {} FROM article_comments c JOIN users u ON u.id = c.author_id WHERE c.id = $1",
            COMMENT_COLUMNS
        );
        let comment = sqlx::query_as::<_, Comment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(comment)
    }

    pub async fn list_comments(&self, article_id: Uuid) -> Result<Vec<Comment>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM article_comments c JOIN users u ON u.id = c.author_id
            WHERE c.article_id = $1
            ORDER BY c.created_at
            "#,
            COMMENT_COLUMNS
        );
        let comments = sqlx::query_as::<_, Comment>(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(comments)
    }

    pub async fn comment_count(&self, article_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM article_comments WHERE article_id = $1")
                .bind(article_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    // =========================================================================
    //  MÍDIA
    // =========================================================================

    pub async fn insert_media(&self, media: &NewMedia) -> Result<Media, AppError> {
        let sql = format!(
            r#"
            INSERT INTO article_media (
                article_id, kind, storage_path, url, name, title, description, position,
                is_main, file_size, content_type, thumbnail_path, thumbnail_url, uploaded_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            MEDIA_COLUMNS
        );
        let row = sqlx::query_as::<_, Media>(&sql)
            .bind(media.article_id)
            .bind(media.kind)
            .bind(&media.storage_path)
            .bind(&media.url)
            .bind(&media.name)
            .bind(&media.title)
            .bind(&media.description)
            .bind(media.position)
            .bind(media.is_main)
            .bind(media.file_size)
            .bind(&media.content_type)
            .bind(&media.thumbnail_path)
            .bind(&media.thumbnail_url)
            .bind(media.uploaded_by)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn next_media_position(&self, article_id: Uuid) -> Result<i32, AppError> {
        let next: i32 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM article_media WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(next)
    }

    pub async fn list_media(&self, article_id: Uuid) -> Result<Vec<Media>, AppError> {
        let sql = format!(
            "SELECT {} FROM article_media WHERE article_id = $1 ORDER BY position, created_at",
            MEDIA_COLUMNS
        );
        let media = sqlx::query_as::<_, Media>(&sql)
            .bind(article_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(media)
    }

    /// Remove a linha e devolve-a (o serviço apaga os ficheiros a seguir).
    pub async fn delete_media(&self, article_id: Uuid, media_id: Uuid) -> Result<Option<Media>, AppError> {
        let sql = format!(
            "DELETE FROM article_media WHERE id = $1 AND article_id = $2 RETURNING {}",
            MEDIA_COLUMNS
        );
        let media = sqlx::query_as::<_, Media>(&sql)
            .bind(media_id)
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(media)
    }

    // =========================================================================
    //  CATEGORIAS E TAGS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color, icon, is_active, position, created_at, updated_at
            FROM news_categories
            WHERE is_active
            ORDER BY position, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category(&self, id: Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, description, color, icon, is_active, position, created_at, updated_at
            FROM news_categories WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn create_category(
        &self,
        name: &str,
        description: &str,
        color: Option<&str>,
        icon: &str,
        position: i32,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO news_categories (name, description, color, icon, position)
            VALUES ($1, $2, COALESCE($3, '#007bff'), $4, $5)
            RETURNING id, name, description, color, icon, is_active, position, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(color)
        .bind(icon)
        .bind(position)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "category_name_taken"))
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, color FROM news_tags ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    pub async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag, AppError> {
        sqlx::query_as::<_, Tag>(
            r#"
            INSERT INTO news_tags (name, color)
            VALUES ($1, COALESCE($2, '#6c757d'))
            RETURNING id, name, color
            "#,
        )
        .bind(name)
        .bind(color)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "tag_name_taken"))
    }
}
