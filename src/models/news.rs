// src/models/news.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

const WORDS_PER_MINUTE: usize = 200;

// =============================================================================
//  1. ENUMS (mapeiam os CREATE TYPE do banco)
// =============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "article_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
    Scheduled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "article_visibility", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ArticleVisibility {
    Public,
    Private,
    Group,
    Partners,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "media_kind", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Image,
    Video,
    Document,
}

// =============================================================================
//  2. CATEGORIAS E TAGS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[schema(example = "Annonces")]
    pub name: String,
    pub description: String,
    #[schema(example = "#007bff")]
    pub color: String,
    pub icon: String,
    pub is_active: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 4, max = 7, message = "invalid_color"))]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Tag {
    pub id: Uuid,
    #[schema(example = "rh")]
    pub name: String,
    pub color: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTagPayload {
    #[validate(length(min = 1, max = 50, message = "required"))]
    pub name: String,
    #[validate(length(min = 4, max = 7, message = "invalid_color"))]
    pub color: Option<String>,
}

// =============================================================================
//  3. ARTIGOS
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: Uuid,
    #[schema(example = "Quarterly Report")]
    pub title: String,
    #[schema(example = "quarterly-report")]
    pub slug: String,
    pub summary: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    pub status: ArticleStatus,
    pub visibility: ArticleVisibility,
    pub publish_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_pinned: bool,
    pub comments_enabled: bool,
    pub notifications_enabled: bool,
    pub views: i32,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    /// Publicado = PUBLISHED e `now` dentro de [publish_date, expiry_date).
    pub fn is_published(&self, now: DateTime<Utc>) -> bool {
        self.status == ArticleStatus::Published
            && self.publish_date <= now
            && self.expiry_date.is_none_or(|expiry| expiry > now)
    }

    pub fn reading_time(&self) -> u32 {
        reading_time(&self.content)
    }
}

/// Minutos de leitura a 200 palavras/minuto, no mínimo 1.
pub fn reading_time(content: &str) -> u32 {
    let words = content.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Relação do leitor com um artigo GROUP/PARTNERS (calculada no banco).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArticleAudience {
    /// Membro de algum dos grupos-alvo do artigo
    pub in_target_group: bool,
    /// A empresa do leitor tem alguém num grupo da empresa do artigo
    pub is_partner: bool,
}

// Detalhe completo: artigo + relações + dados do leitor
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    #[serde(flatten)]
    pub article: Article,
    pub reading_time: u32,
    pub category: Option<Category>,
    pub tags: Vec<Tag>,
    pub group_ids: Vec<Uuid>,
    pub media: Vec<Media>,
    pub comment_count: i64,
    pub is_liked: bool,
}

// Linha da listagem (sem o conteúdo completo)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub author_id: Uuid,
    pub author_username: String,
    pub company_id: Uuid,
    pub category_id: Option<Uuid>,
    pub status: ArticleStatus,
    pub visibility: ArticleVisibility,
    pub publish_date: DateTime<Utc>,
    pub is_pinned: bool,
    pub views: i32,
    pub likes: i32,
    pub reading_time: u32,
}

impl From<Article> for ArticleSummary {
    fn from(a: Article) -> Self {
        let reading_time = a.reading_time();
        Self {
            id: a.id,
            title: a.title,
            slug: a.slug,
            summary: a.summary,
            author_id: a.author_id,
            author_username: a.author_username,
            company_id: a.company_id,
            category_id: a.category_id,
            status: a.status,
            visibility: a.visibility,
            publish_date: a.publish_date,
            is_pinned: a.is_pinned,
            views: a.views,
            likes: a.likes,
            reading_time,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePage {
    pub items: Vec<ArticleSummary>,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticlePayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Quarterly Report")]
    pub title: String,
    #[validate(length(max = 500, message = "too_long"))]
    #[serde(default)]
    pub summary: String,
    #[validate(length(min = 1, message = "required"))]
    pub content: String,
    pub category_id: Option<Uuid>,
    pub status: Option<ArticleStatus>,
    pub visibility: Option<ArticleVisibility>,
    pub publish_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_pinned: bool,
    pub comments_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
    #[serde(default)]
    pub tag_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

// Campo ausente -> None; `null` explícito -> Some(None)
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// PUT: só os campos presentes são alterados; `null` limpa categoria e expiração
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticlePayload {
    #[validate(length(min = 1, max = 200, message = "required"))]
    pub title: Option<String>,
    #[validate(length(max = 500, message = "too_long"))]
    pub summary: Option<String>,
    #[validate(length(min = 1, message = "required"))]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub status: Option<ArticleStatus>,
    pub visibility: Option<ArticleVisibility>,
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub expiry_date: Option<Option<DateTime<Utc>>>,
    pub is_pinned: Option<bool>,
    pub comments_enabled: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub group_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFilter {
    pub status: Option<ArticleStatus>,
    pub visibility: Option<ArticleVisibility>,
    pub category: Option<Uuid>,
    pub pinned: Option<bool>,
    /// Procura em título, resumo e conteúdo
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ArticleFilter {
    pub const DEFAULT_PAGE_SIZE: i64 = 20;
    pub const MAX_PAGE_SIZE: i64 = 100;
    pub const MAX_PAGE: i64 = 10_000;

    /// (página, tamanho, offset), com página em [1, 10000] e tamanho em [1, 100].
    pub fn pagination(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, Self::MAX_PAGE);
        let size = self
            .page_size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE);
        (page, size, (page - 1) * size)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PopularQuery {
    /// Janela em dias (padrão 7)
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub liked: bool,
    pub likes: i32,
}

// =============================================================================
//  4. MÍDIA
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    pub article_id: Uuid,
    pub kind: MediaKind,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub storage_path: String,
    pub url: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub position: i32,
    pub is_main: bool,
    pub file_size: i64,
    pub content_type: String,
    pub duration: Option<f64>,
    #[serde(skip_serializing)]
    #[schema(ignore)]
    pub thumbnail_path: Option<String>,
    pub thumbnail_url: Option<String>,
    pub uploaded_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Dados para o INSERT em article_media (montados pelo serviço após gravar os ficheiros)
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub article_id: Uuid,
    pub kind: MediaKind,
    pub storage_path: String,
    pub url: String,
    pub name: String,
    pub title: String,
    pub description: String,
    pub position: i32,
    pub is_main: bool,
    pub file_size: i64,
    pub content_type: String,
    pub thumbnail_path: Option<String>,
    pub thumbnail_url: Option<String>,
    pub uploaded_by: Uuid,
}

// =============================================================================
//  5. COMENTÁRIOS
// =============================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub article_id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub content: String,
    pub parent_id: Option<Uuid>,
    pub is_moderated: bool,
    pub is_flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    #[schema(no_recursion)]
    pub replies: Vec<CommentNode>,
}

/// Monta a árvore de comentários. A ordem de entrada (created_at) é preservada
/// em cada nível; respostas cujo pai não está na lista são descartadas.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentNode> {
    let mut children: HashMap<Uuid, Vec<Comment>> = HashMap::new();
    let mut roots = Vec::new();

    for comment in comments {
        match comment.parent_id {
            Some(parent) => children.entry(parent).or_default().push(comment),
            None => roots.push(comment),
        }
    }

    fn attach(comment: Comment, children: &mut HashMap<Uuid, Vec<Comment>>) -> CommentNode {
        let replies = children
            .remove(&comment.id)
            .unwrap_or_default()
            .into_iter()
            .map(|reply| attach(reply, children))
            .collect();
        CommentNode { comment, replies }
    }

    roots
        .into_iter()
        .map(|root| attach(root, &mut children))
        .collect()
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentPayload {
    #[validate(length(min = 1, max = 5000, message = "required"))]
    pub content: String,
    pub parent_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn article(status: ArticleStatus, publish: DateTime<Utc>, expiry: Option<DateTime<Utc>>) -> Article {
        Article {
            id: Uuid::new_v4(),
            title: "t".into(),
            slug: "t".into(),
            summary: String::new(),
            content: "um dois três".into(),
            author_id: Uuid::new_v4(),
            author_username: "autor".into(),
            company_id: Uuid::new_v4(),
            category_id: None,
            status,
            visibility: ArticleVisibility::Public,
            publish_date: publish,
            expiry_date: expiry,
            is_pinned: false,
            comments_enabled: true,
            notifications_enabled: true,
            views: 0,
            likes: 0,
            created_at: publish,
            updated_at: publish,
        }
    }

    #[test]
    fn published_window_is_half_open() {
        let now = Utc::now();
        let publish = now - Duration::hours(1);
        let expiry = now + Duration::hours(1);

        assert!(article(ArticleStatus::Published, publish, None).is_published(now));
        assert!(article(ArticleStatus::Published, publish, Some(expiry)).is_published(now));
        // publish_date == now conta; expiry_date == now já não
        assert!(article(ArticleStatus::Published, now, None).is_published(now));
        assert!(!article(ArticleStatus::Published, publish, Some(now)).is_published(now));
        assert!(!article(ArticleStatus::Published, expiry, None).is_published(now));
    }

    #[test]
    fn only_published_status_counts() {
        let now = Utc::now();
        let publish = now - Duration::hours(1);
        for status in [ArticleStatus::Draft, ArticleStatus::Archived, ArticleStatus::Scheduled] {
            assert!(!article(status, publish, None).is_published(now));
        }
    }

    #[test]
    fn reading_time_rounds_up_with_minimum_of_one() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("palavra"), 1);
        assert_eq!(reading_time(&"w ".repeat(200)), 1);
        assert_eq!(reading_time(&"w ".repeat(201)), 2);
        assert_eq!(reading_time(&"w ".repeat(1000)), 5);
    }

    #[test]
    fn pagination_is_clamped() {
        let f = ArticleFilter { page: Some(0), page_size: Some(1000), ..Default::default() };
        assert_eq!(f.pagination(), (1, 100, 0));

        let f = ArticleFilter { page: Some(3), ..Default::default() };
        assert_eq!(f.pagination(), (3, 20, 40));

        // Página enorme não estoura o offset
        let f = ArticleFilter { page: Some(i64::MAX), page_size: Some(i64::MAX), ..Default::default() };
        assert_eq!(f.pagination(), (10_000, 100, 9_999 * 100));

        let f = ArticleFilter { page: Some(i64::MIN), ..Default::default() };
        assert_eq!(f.pagination(), (1, 20, 0));
    }

    #[test]
    fn update_payload_tells_missing_from_null() {
        let p: UpdateArticlePayload = serde_json::from_str(r#"{"title":"T"}"#).unwrap();
        assert_eq!(p.category_id, None);
        assert_eq!(p.expiry_date, None);

        let p: UpdateArticlePayload =
            serde_json::from_str(r#"{"categoryId":null,"expiryDate":null}"#).unwrap();
        assert_eq!(p.category_id, Some(None));
        assert_eq!(p.expiry_date, Some(None));

        let id = Uuid::new_v4();
        let p: UpdateArticlePayload =
            serde_json::from_str(&format!(r#"{{"categoryId":"{}"}}"#, id)).unwrap();
        assert_eq!(p.category_id, Some(Some(id)));
    }

    fn comment(id: Uuid, parent: Option<Uuid>) -> Comment {
        Comment {
            id,
            article_id: Uuid::nil(),
            author_id: Uuid::new_v4(),
            author_username: "u".into(),
            content: "c".into(),
            parent_id: parent,
            is_moderated: false,
            is_flagged: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn comment_tree_nests_replies_under_their_parent() {
        let root_a = Uuid::new_v4();
        let root_b = Uuid::new_v4();
        let reply = Uuid::new_v4();
        let nested = Uuid::new_v4();

        let tree = build_comment_tree(vec![
            comment(root_a, None),
            comment(reply, Some(root_a)),
            comment(root_b, None),
            comment(nested, Some(reply)),
        ]);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].comment.id, root_a);
        assert_eq!(tree[0].replies.len(), 1);
        assert_eq!(tree[0].replies[0].comment.id, reply);
        assert_eq!(tree[0].replies[0].replies[0].comment.id, nested);
        assert!(tree[1].replies.is_empty());
    }
}
