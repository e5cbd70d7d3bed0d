// src/services/article_service.rs

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        slug::{next_free_slug, slugify},
    },
    db::{article_repo::ArticleFields, ArticleRepository, CompanyRepository},
    models::{
        company::Profile,
        news::{
            build_comment_tree, Article, ArticleAudience, ArticleDetail, ArticleFilter,
            ArticlePage, ArticleStatus, ArticleSummary, ArticleVisibility, Category, CommentNode,
            Comment, CreateArticlePayload, CreateCategoryPayload, CreateCommentPayload,
            CreateTagPayload, LikeToggleResponse, Media, MediaKind, NewMedia, Tag,
            UpdateArticlePayload,
        },
    },
    services::{
        media::{validate_upload, with_extension, MediaProcessor},
        notification_service::NotificationService,
        storage::FileStorage,
        visibility::{can_manage_article, resolve_article_visibility, ArticleViewer},
    },
};

// Quantas vezes o INSERT tenta outro sufixo depois de perder a corrida do slug
const MAX_SLUG_ATTEMPTS: u32 = 10;
// Folga para relógios de cliente ligeiramente atrasados
const PUBLISH_DATE_GRACE_SECS: i64 = 60;
const POPULAR_LIMIT: i64 = 10;
const DEFAULT_POPULAR_DAYS: i64 = 7;

/// Quem está a ler: o utilizador (se houver) e o seu perfil.
#[derive(Debug, Clone, Default)]
pub struct Reader {
    pub user_id: Option<Uuid>,
    pub profile: Option<Profile>,
}

impl Reader {
    fn viewer(&self) -> ArticleViewer {
        ArticleViewer {
            user_id: self.user_id,
            company_id: self.profile.as_ref().map(|p| p.company_id),
        }
    }
}

/// Dados do pedido guardados com a visualização.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub ip_address: Option<String>,
    pub user_agent: String,
}

/// Ficheiro recebido no multipart, antes da validação.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
    pub title: String,
    pub description: String,
    pub is_main: bool,
}

/// Valida as datas de publicação. `now` só é usado se `check_past` for true.
pub fn validate_dates(
    publish_date: DateTime<Utc>,
    expiry_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    check_past: bool,
) -> Result<(), AppError> {
    if check_past && publish_date < now - Duration::seconds(PUBLISH_DATE_GRACE_SECS) {
        return Err(AppError::InvalidInput("publish_date_in_past"));
    }
    if let Some(expiry) = expiry_date {
        if expiry <= publish_date {
            return Err(AppError::InvalidInput("expiry_before_publish"));
        }
    }
    Ok(())
}

/// Aplica um PUT parcial sobre os campos atuais do artigo.
pub fn merge_update(article: &Article, payload: &UpdateArticlePayload) -> ArticleFields {
    ArticleFields {
        title: payload.title.clone().unwrap_or_else(|| article.title.clone()),
        summary: payload.summary.clone().unwrap_or_else(|| article.summary.clone()),
        content: payload.content.clone().unwrap_or_else(|| article.content.clone()),
        category_id: payload.category_id.unwrap_or(article.category_id),
        status: payload.status.unwrap_or(article.status),
        visibility: payload.visibility.unwrap_or(article.visibility),
        publish_date: payload.publish_date.unwrap_or(article.publish_date),
        expiry_date: payload.expiry_date.unwrap_or(article.expiry_date),
        is_pinned: payload.is_pinned.unwrap_or(article.is_pinned),
        comments_enabled: payload.comments_enabled.unwrap_or(article.comments_enabled),
        notifications_enabled: payload.notifications_enabled.unwrap_or(article.notifications_enabled),
    }
}

#[derive(Clone)]
pub struct ArticleService {
    article_repo: ArticleRepository,
    company_repo: CompanyRepository,
    notifications: NotificationService,
    storage: Arc<dyn FileStorage>,
    processor: Arc<dyn MediaProcessor>,
    pool: PgPool,
}

impl ArticleService {
    pub fn new(
        article_repo: ArticleRepository,
        company_repo: CompanyRepository,
        notifications: NotificationService,
        storage: Arc<dyn FileStorage>,
        processor: Arc<dyn MediaProcessor>,
        pool: PgPool,
    ) -> Self {
        Self { article_repo, company_repo, notifications, storage, processor, pool }
    }

    pub async fn reader(&self, user_id: Option<Uuid>) -> Result<Reader, AppError> {
        let profile = match user_id {
            Some(id) => self.company_repo.find_profile(id).await?,
            None => None,
        };
        Ok(Reader { user_id, profile })
    }

    // Carrega o artigo se o leitor o puder ver; invisível = não encontrado
    async fn load_visible(&self, reader: &Reader, id: Uuid) -> Result<Article, AppError> {
        let article = self
            .article_repo
            .find_article(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("article_not_found"))?;

        let viewer = reader.viewer();
        let audience = match (viewer.user_id, article.visibility) {
            (Some(user_id), ArticleVisibility::Group | ArticleVisibility::Partners) => {
                self.article_repo
                    .audience(article.id, article.company_id, user_id, viewer.company_id)
                    .await?
            }
            _ => ArticleAudience::default(),
        };

        if resolve_article_visibility(&viewer, &article, audience, Utc::now()) {
            Ok(article)
        } else {
            Err(AppError::NotFound("article_not_found"))
        }
    }

    async fn load_manageable(&self, reader: &Reader, id: Uuid) -> Result<Article, AppError> {
        let article = self
            .article_repo
            .find_article(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("article_not_found"))?;

        let user_id = reader.user_id.ok_or(AppError::InvalidToken)?;
        if !can_manage_article(user_id, reader.profile.as_ref(), &article) {
            return Err(AppError::Forbidden("article_manage_forbidden"));
        }
        Ok(article)
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<(), AppError> {
        if let Some(id) = category_id {
            if self.article_repo.find_category(id).await?.is_none() {
                return Err(AppError::NotFound("category_not_found"));
            }
        }
        Ok(())
    }

    // =========================================================================
    //  1. CRIAÇÃO (slug único com retentativa)
    // =========================================================================

    pub async fn create_article(
        &self,
        author_id: Uuid,
        payload: &CreateArticlePayload,
    ) -> Result<Article, AppError> {
        let profile = self
            .company_repo
            .find_profile(author_id)
            .await?
            .ok_or(AppError::NotFound("profile_required"))?;

        let now = Utc::now();
        let publish_date = payload.publish_date.unwrap_or(now);
        validate_dates(publish_date, payload.expiry_date, now, payload.publish_date.is_some())?;
        self.ensure_category(payload.category_id).await?;

        let fields = ArticleFields {
            title: payload.title.trim().to_string(),
            summary: payload.summary.clone(),
            content: payload.content.clone(),
            category_id: payload.category_id,
            status: payload.status.unwrap_or(ArticleStatus::Draft),
            visibility: payload.visibility.unwrap_or(ArticleVisibility::Public),
            publish_date,
            expiry_date: payload.expiry_date,
            is_pinned: payload.is_pinned,
            comments_enabled: payload.comments_enabled.unwrap_or(true),
            notifications_enabled: payload.notifications_enabled.unwrap_or(true),
        };

        let base = slugify(&fields.title);

        // 1. Inicia a transação
        let mut tx = self.pool.begin().await?;

        // 2. Escolhe o slug livre e tenta o INSERT num savepoint.
        //    Se outro pedido levar o mesmo slug entre a leitura e o INSERT,
        //    desfaz o savepoint e continua a partir do candidato seguinte.
        let mut attempt = 0;
        let mut created = None;
        for _ in 0..MAX_SLUG_ATTEMPTS {
            let taken = self.article_repo.taken_slugs(&mut *tx, &base).await?;
            let (slug, index) = next_free_slug(&base, &taken, attempt);

            let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
            match self
                .article_repo
                .insert_article(&mut *savepoint, &fields, &slug, author_id, profile.company_id)
                .await
            {
                Ok(article) => {
                    savepoint.commit().await?;
                    created = Some(article);
                    break;
                }
                Err(AppError::Conflict("article_slug_taken")) => {
                    savepoint.rollback().await?;
                    tracing::debug!("Slug '{}' ocupado em concorrência, tentando o próximo", slug);
                    attempt = index + 1;
                }
                Err(e) => return Err(e),
            }
        }
        let article = created.ok_or(AppError::Conflict("slug_exhausted"))?;

        // 3. Tags e grupos-alvo
        self.article_repo.replace_tags(&mut tx, article.id, &payload.tag_ids).await?;
        self.article_repo.replace_groups(&mut tx, article.id, &payload.group_ids).await?;

        // 4. Commit
        tx.commit().await?;

        tracing::info!("📰 Artigo '{}' criado por {}", article.slug, author_id);

        // 5. Avisos (depois do commit, melhor esforço)
        if article.status == ArticleStatus::Published && article.notifications_enabled {
            self.notifications.notify_new_article(&article).await;
        }

        Ok(article)
    }

    // =========================================================================
    //  2. LEITURA
    // =========================================================================

    /// Detalhe do artigo. Leitor autenticado conta uma visualização (uma vez).
    pub async fn get_article(
        &self,
        reader: &Reader,
        id: Uuid,
        view: &ViewContext,
    ) -> Result<ArticleDetail, AppError> {
        let mut article = self.load_visible(reader, id).await?;

        let mut is_liked = false;
        if let Some(user_id) = reader.user_id {
            let mut tx = self.pool.begin().await?;
            let first_view = self
                .article_repo
                .record_view(&mut tx, article.id, user_id, view.ip_address.as_deref(), &view.user_agent)
                .await?;
            tx.commit().await?;
            if first_view {
                article.views += 1;
            }
            is_liked = self.article_repo.is_liked(article.id, user_id).await?;
        }

        let category = match article.category_id {
            Some(category_id) => self.article_repo.find_category(category_id).await?,
            None => None,
        };
        let tags = self.article_repo.tags_of(article.id).await?;
        let group_ids = self.article_repo.group_ids_of(article.id).await?;
        let media = self.article_repo.list_media(article.id).await?;
        let comment_count = self.article_repo.comment_count(article.id).await?;

        Ok(ArticleDetail {
            reading_time: article.reading_time(),
            article,
            category,
            tags,
            group_ids,
            media,
            comment_count,
            is_liked,
        })
    }

    pub async fn list_articles(&self, reader: &Reader, filter: &ArticleFilter) -> Result<ArticlePage, AppError> {
        let viewer = reader.viewer();
        let (page, page_size, _) = filter.pagination();
        let articles = self
            .article_repo
            .list_visible(viewer.user_id, viewer.company_id, filter, Utc::now())
            .await?;

        Ok(ArticlePage {
            items: articles.into_iter().map(ArticleSummary::from).collect(),
            page,
            page_size,
        })
    }

    pub async fn my_articles(&self, author_id: Uuid) -> Result<Vec<ArticleSummary>, AppError> {
        let articles = self.article_repo.list_by_author(author_id).await?;
        Ok(articles.into_iter().map(ArticleSummary::from).collect())
    }

    pub async fn popular(&self, reader: &Reader, days: Option<i64>) -> Result<Vec<ArticleSummary>, AppError> {
        let days = days.unwrap_or(DEFAULT_POPULAR_DAYS).clamp(1, 365);
        let now = Utc::now();
        let viewer = reader.viewer();
        let articles = self
            .article_repo
            .popular(viewer.user_id, viewer.company_id, now - Duration::days(days), now, POPULAR_LIMIT)
            .await?;
        Ok(articles.into_iter().map(ArticleSummary::from).collect())
    }

    // =========================================================================
    //  3. EDIÇÃO E REMOÇÃO
    // =========================================================================

    pub async fn update_article(
        &self,
        reader: &Reader,
        id: Uuid,
        payload: &UpdateArticlePayload,
    ) -> Result<Article, AppError> {
        let current = self.load_manageable(reader, id).await?;

        let fields = merge_update(&current, payload);
        let check_past = payload.publish_date.is_some_and(|d| d != current.publish_date);
        validate_dates(fields.publish_date, fields.expiry_date, Utc::now(), check_past)?;
        if let Some(category_id) = payload.category_id {
            self.ensure_category(category_id).await?;
        }

        let mut tx = self.pool.begin().await?;
        let article = self.article_repo.update_article(&mut *tx, id, &fields).await?;
        if let Some(tag_ids) = &payload.tag_ids {
            self.article_repo.replace_tags(&mut tx, id, tag_ids).await?;
        }
        if let Some(group_ids) = &payload.group_ids {
            self.article_repo.replace_groups(&mut tx, id, group_ids).await?;
        }
        tx.commit().await?;

        tracing::info!("✏️ Artigo '{}' atualizado", article.slug);
        Ok(article)
    }

    /// Apaga o artigo (cascata no banco) e depois os ficheiros das mídias.
    pub async fn delete_article(&self, reader: &Reader, id: Uuid) -> Result<(), AppError> {
        let article = self.load_manageable(reader, id).await?;
        let media = self.article_repo.list_media(article.id).await?;

        self.article_repo.delete_article(&self.pool, article.id).await?;
        tracing::info!("🗑️ Artigo '{}' apagado", article.slug);

        for item in &media {
            self.remove_media_files(item).await;
        }
        Ok(())
    }

    // =========================================================================
    //  4. LIKES E COMENTÁRIOS
    // =========================================================================

    pub async fn toggle_like(&self, reader: &Reader, id: Uuid) -> Result<LikeToggleResponse, AppError> {
        let user_id = reader.user_id.ok_or(AppError::InvalidToken)?;
        let article = self.load_visible(reader, id).await?;

        let mut tx = self.pool.begin().await?;
        let (liked, likes) = self.article_repo.toggle_like(&mut tx, article.id, user_id).await?;
        tx.commit().await?;

        if liked {
            self.notifications.notify_like(&article, user_id).await;
        }

        Ok(LikeToggleResponse { liked, likes })
    }

    pub async fn add_comment(
        &self,
        reader: &Reader,
        id: Uuid,
        payload: &CreateCommentPayload,
    ) -> Result<Comment, AppError> {
        let user_id = reader.user_id.ok_or(AppError::InvalidToken)?;
        let article = self.load_visible(reader, id).await?;

        if !article.comments_enabled {
            return Err(AppError::InvalidInput("comments_disabled"));
        }

        let parent_author = match payload.parent_id {
            Some(parent_id) => {
                let parent = self
                    .article_repo
                    .find_comment(parent_id)
                    .await?
                    .filter(|c| c.article_id == article.id)
                    .ok_or(AppError::InvalidInput("parent_comment_mismatch"))?;
                Some(parent.author_id)
            }
            None => None,
        };

        let comment = self
            .article_repo
            .insert_comment(&self.pool, article.id, user_id, payload.content.trim(), payload.parent_id)
            .await?;

        self.notifications.notify_comment(&article, user_id, parent_author).await;

        Ok(comment)
    }

    pub async fn list_comments(&self, reader: &Reader, id: Uuid) -> Result<Vec<CommentNode>, AppError> {
        let article = self.load_visible(reader, id).await?;
        let comments = self.article_repo.list_comments(article.id).await?;
        Ok(build_comment_tree(comments))
    }

    // =========================================================================
    //  5. MÍDIA
    // =========================================================================

    pub async fn upload_media(
        &self,
        reader: &Reader,
        id: Uuid,
        file: UploadedFile,
    ) -> Result<Media, AppError> {
        let user_id = reader.user_id.ok_or(AppError::InvalidToken)?;
        let article = self.load_manageable(reader, id).await?;

        let upload = validate_upload(&file.file_name, file.content_type.as_deref(), file.data.len())?;

        // 1. Compressão de imagens (falha = guarda o original)
        let mut data = file.data;
        let mut file_name = upload.file_name.clone();
        let mut content_type = upload.content_type.clone();
        if upload.is_compressible() {
            let processor = Arc::clone(&self.processor);
            let original = data.clone();
            match tokio::task::spawn_blocking(move || processor.compress(&original)).await {
                Ok(Ok(processed)) => {
                    data = Bytes::from(processed.bytes);
                    file_name = with_extension(&file_name, processed.extension);
                    content_type = processed.content_type.to_string();
                }
                Ok(Err(e)) => tracing::warn!("⚠️ Compressão falhou para '{}': {}", file_name, e),
                Err(e) => tracing::warn!("⚠️ Task de compressão abortou: {}", e),
            }
        }

        // 2. Grava o ficheiro
        let storage_path = format!("articles/{}/media/{}_{}", article.id, Uuid::new_v4(), file_name);
        let stored = self
            .storage
            .save(&storage_path, data.clone(), &content_type)
            .await?;

        // 3. Miniatura de vídeo (opcional)
        let mut thumbnail = None;
        if upload.kind == MediaKind::Video {
            let processor = Arc::clone(&self.processor);
            let video = data.clone();
            match tokio::task::spawn_blocking(move || processor.extract_thumbnail(&video)).await {
                Ok(Ok(Some(image))) => {
                    let path = format!("articles/{}/thumbnails/{}.{}", article.id, Uuid::new_v4(), image.extension);
                    match self.storage.save(&path, Bytes::from(image.bytes), image.content_type).await {
                        Ok(saved) => thumbnail = Some(saved),
                        Err(e) => tracing::warn!("⚠️ Falha ao gravar a miniatura: {}", e),
                    }
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => tracing::warn!("⚠️ Miniatura falhou para '{}': {}", file_name, e),
                Err(e) => tracing::warn!("⚠️ Task de miniatura abortou: {}", e),
            }
        }

        // 4. Linha no banco; se falhar, o ficheiro não fica órfão
        let position = self.article_repo.next_media_position(article.id).await?;
        let new_media = NewMedia {
            article_id: article.id,
            kind: upload.kind,
            storage_path: stored.path.clone(),
            url: stored.url.clone(),
            name: file_name,
            title: file.title,
            description: file.description,
            position,
            is_main: file.is_main,
            file_size: stored.size as i64,
            content_type,
            thumbnail_path: thumbnail.as_ref().map(|t| t.path.clone()),
            thumbnail_url: thumbnail.as_ref().map(|t| t.url.clone()),
            uploaded_by: user_id,
        };

        match self.article_repo.insert_media(&new_media).await {
            Ok(media) => {
                tracing::info!("📎 Mídia {:?} anexada ao artigo '{}'", media.kind, article.slug);
                Ok(media)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&stored.path).await {
                    tracing::warn!("⚠️ Ficheiro órfão '{}': {}", stored.path, cleanup);
                }
                if let Some(t) = &thumbnail {
                    if let Err(cleanup) = self.storage.delete(&t.path).await {
                        tracing::warn!("⚠️ Miniatura órfã '{}': {}", t.path, cleanup);
                    }
                }
                Err(e)
            }
        }
    }

    /// Remove a linha e depois os ficheiros (falhas de disco só vão para o log).
    pub async fn delete_media(&self, reader: &Reader, article_id: Uuid, media_id: Uuid) -> Result<(), AppError> {
        let article = self.load_manageable(reader, article_id).await?;

        let media = self
            .article_repo
            .delete_media(article.id, media_id)
            .await?
            .ok_or(AppError::NotFound("media_not_found"))?;

        self.remove_media_files(&media).await;
        Ok(())
    }

    async fn remove_media_files(&self, media: &Media) {
        let paths = std::iter::once(&media.storage_path).chain(media.thumbnail_path.as_ref());
        for path in paths {
            if let Err(e) = self.storage.delete(path).await {
                tracing::warn!("⚠️ Falha ao apagar '{}': {}", path, e);
            }
        }
    }

    // =========================================================================
    //  6. CATEGORIAS E TAGS
    // =========================================================================

    fn require_company_admin(reader: &Reader) -> Result<(), AppError> {
        match &reader.profile {
            Some(p) if p.is_admin() => Ok(()),
            _ => Err(AppError::Forbidden("company_admin_required")),
        }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        self.article_repo.list_categories().await
    }

    pub async fn create_category(&self, reader: &Reader, payload: &CreateCategoryPayload) -> Result<Category, AppError> {
        Self::require_company_admin(reader)?;
        self.article_repo
            .create_category(
                payload.name.trim(),
                &payload.description,
                payload.color.as_deref(),
                &payload.icon,
                payload.position,
            )
            .await
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, AppError> {
        self.article_repo.list_tags().await
    }

    pub async fn create_tag(&self, reader: &Reader, payload: &CreateTagPayload) -> Result<Tag, AppError> {
        Self::require_company_admin(reader)?;
        self.article_repo
            .create_tag(payload.name.trim(), payload.color.as_deref())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_date_cannot_be_in_the_past() {
        let now = Utc::now();
        let err = validate_dates(now - Duration::days(1), None, now, true).unwrap_err();
        assert_eq!(err.code(), "publish_date_in_past");

        // Sem data explícita não há verificação
        assert!(validate_dates(now - Duration::days(1), None, now, false).is_ok());
        // Pequeno atraso de relógio é tolerado
        assert!(validate_dates(now - Duration::seconds(5), None, now, true).is_ok());
    }

    #[test]
    fn expiry_must_be_strictly_after_publish() {
        let now = Utc::now();
        let publish = now + Duration::hours(1);
        assert_eq!(
            validate_dates(publish, Some(publish), now, true).unwrap_err().code(),
            "expiry_before_publish"
        );
        assert!(validate_dates(publish, Some(publish + Duration::seconds(1)), now, true).is_ok());
    }

    #[test]
    fn partial_update_keeps_untouched_fields() {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            title: "Antigo".into(),
            slug: "antigo".into(),
            summary: "resumo".into(),
            content: "texto".into(),
            author_id: Uuid::new_v4(),
            author_username: "autor".into(),
            company_id: Uuid::new_v4(),
            category_id: None,
            status: ArticleStatus::Draft,
            visibility: ArticleVisibility::Private,
            publish_date: now,
            expiry_date: None,
            is_pinned: false,
            comments_enabled: true,
            notifications_enabled: true,
            views: 3,
            likes: 1,
            created_at: now,
            updated_at: now,
        };
        let payload = UpdateArticlePayload {
            title: Some("Novo".into()),
            summary: None,
            content: None,
            category_id: None,
            status: Some(ArticleStatus::Published),
            visibility: None,
            publish_date: None,
            expiry_date: None,
            is_pinned: None,
            comments_enabled: Some(false),
            notifications_enabled: None,
            tag_ids: None,
            group_ids: None,
        };

        let fields = merge_update(&article, &payload);
        assert_eq!(fields.title, "Novo");
        assert_eq!(fields.summary, "resumo");
        assert_eq!(fields.status, ArticleStatus::Published);
        assert_eq!(fields.visibility, ArticleVisibility::Private);
        assert!(!fields.comments_enabled);
        assert!(fields.notifications_enabled);
    }

    #[test]
    fn explicit_null_clears_category_and_expiry() {
        let now = Utc::now();
        let category = Uuid::new_v4();
        let article = Article {
            id: Uuid::new_v4(),
            title: "Com prazo".into(),
            slug: "com-prazo".into(),
            summary: String::new(),
            content: "texto".into(),
            author_id: Uuid::new_v4(),
            author_username: "autor".into(),
            company_id: Uuid::new_v4(),
            category_id: Some(category),
            status: ArticleStatus::Published,
            visibility: ArticleVisibility::Public,
            publish_date: now,
            expiry_date: Some(now + Duration::days(3)),
            is_pinned: false,
            comments_enabled: true,
            notifications_enabled: true,
            views: 0,
            likes: 0,
            created_at: now,
            updated_at: now,
        };

        let keep: UpdateArticlePayload = serde_json::from_str(r#"{"title":"Outro"}"#).unwrap();
        let fields = merge_update(&article, &keep);
        assert_eq!(fields.category_id, Some(category));
        assert_eq!(fields.expiry_date, article.expiry_date);

        let clear: UpdateArticlePayload =
            serde_json::from_str(r#"{"categoryId":null,"expiryDate":null}"#).unwrap();
        let fields = merge_update(&article, &clear);
        assert_eq!(fields.category_id, None);
        assert_eq!(fields.expiry_date, None);
    }
}
