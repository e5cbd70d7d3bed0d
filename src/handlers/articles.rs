// src/handlers/articles.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        i18n::Locale,
    },
    models::news::{
        Article, ArticleDetail, ArticleFilter, ArticlePage, ArticleSummary, Comment, CommentNode,
        CreateArticlePayload, CreateCommentPayload, LikeToggleResponse, Media, PopularQuery,
        UpdateArticlePayload,
    },
    services::article_service::{UploadedFile, ViewContext},
};

// Dados do cliente guardados com a visualização. Atrás de proxy vale o X-Forwarded-For.
fn view_context(headers: &HeaderMap) -> ViewContext {
    let header_str = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let ip_address = header_str("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .or_else(|| header_str("x-real-ip"))
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string);

    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    ViewContext { ip_address, user_agent }
}

// ---
// Artigos
// ---

// GET /api/articles
// Anónimos só veem PUBLIC publicados.
#[utoipa::path(
    get,
    path = "/api/articles",
    tag = "News",
    params(ArticleFilter),
    responses(
        (status = 200, description = "Artigos visíveis ao leitor", body = ArticlePage)
    )
)]
pub async fn list_articles(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    Query(filter): Query<ArticleFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(user.map(|u| u.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let page = service
        .list_articles(&reader, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(page)))
}

// POST /api/articles
#[utoipa::path(
    post,
    path = "/api/articles",
    tag = "News",
    request_body = CreateArticlePayload,
    responses(
        (status = 201, description = "Artigo criado com slug único", body = Article),
        (status = 400, description = "Datas inválidas"),
        (status = 404, description = "Autor sem perfil ou categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_article(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateArticlePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let article = app_state
        .article_service
        .create_article(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(article)))
}

// GET /api/articles/mine
#[utoipa::path(
    get,
    path = "/api/articles/mine",
    tag = "News",
    responses(
        (status = 200, description = "Artigos do autor, em qualquer estado", body = Vec<ArticleSummary>)
    ),
    security(("api_jwt" = []))
)]
pub async fn my_articles(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let articles = app_state
        .article_service
        .my_articles(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(articles)))
}

// GET /api/articles/popular?days=7
#[utoipa::path(
    get,
    path = "/api/articles/popular",
    tag = "News",
    params(PopularQuery),
    responses(
        (status = 200, description = "Os 10 mais vistos da janela", body = Vec<ArticleSummary>)
    )
)]
pub async fn popular_articles(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    Query(query): Query<PopularQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(user.map(|u| u.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let articles = service
        .popular(&reader, query.days)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(articles)))
}

// GET /api/articles/{id}
#[utoipa::path(
    get,
    path = "/api/articles/{id}",
    tag = "News",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Detalhe; conta a visualização do leitor autenticado", body = ArticleDetail),
        (status = 404, description = "Inexistente ou invisível para o leitor")
    )
)]
pub async fn get_article(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(user.map(|u| u.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let detail = service
        .get_article(&reader, id, &view_context(&headers))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/articles/{id}
#[utoipa::path(
    put,
    path = "/api/articles/{id}",
    tag = "News",
    request_body = UpdateArticlePayload,
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Artigo atualizado", body = Article),
        (status = 403, description = "Nem autor nem ADMIN da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_article(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArticlePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let article = service
        .update_article(&reader, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(article)))
}

// DELETE /api/articles/{id}
#[utoipa::path(
    delete,
    path = "/api/articles/{id}",
    tag = "News",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 204, description = "Artigo e mídias apagados"),
        (status = 403, description = "Nem autor nem ADMIN da empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_article(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    service
        .delete_article(&reader, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Likes e comentários
// ---

// POST /api/articles/{id}/toggle_like
#[utoipa::path(
    post,
    path = "/api/articles/{id}/toggle_like",
    tag = "News",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Novo estado do like e total", body = LikeToggleResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn toggle_like(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = service
        .toggle_like(&reader, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/articles/{id}/comments
#[utoipa::path(
    get,
    path = "/api/articles/{id}/comments",
    tag = "News",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 200, description = "Comentários em árvore", body = Vec<CommentNode>)
    )
)]
pub async fn list_comments(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(user): MaybeUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(user.map(|u| u.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let comments = service
        .list_comments(&reader, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(comments)))
}

// POST /api/articles/{id}/comments (e /comment)
#[utoipa::path(
    post,
    path = "/api/articles/{id}/comments",
    tag = "News",
    request_body = CreateCommentPayload,
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 201, description = "Comentário criado", body = Comment),
        (status = 400, description = "Comentários desativados ou pai de outro artigo")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_comment(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateCommentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let comment = service
        .add_comment(&reader, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

// ---
// Mídia
// ---

// Lê o multipart: `file` (obrigatório), `title`, `description`, `is_main`
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<(String, Option<String>, Bytes)> = None;
    let mut title = String::new();
    let mut description = String::new();
    let mut is_main = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidInput("invalid_multipart"))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::InvalidInput("file_too_large"))?;
                file = Some((file_name, content_type, data));
            }
            "title" | "description" | "is_main" => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::InvalidInput("invalid_multipart"))?;
                match name.as_str() {
                    "title" => title = value,
                    "description" => description = value,
                    _ => is_main = matches!(value.trim(), "true" | "1" | "on"),
                }
            }
            _ => {}
        }
    }

    let (file_name, content_type, data) = file.ok_or(AppError::InvalidInput("file_required"))?;
    Ok(UploadedFile { file_name, content_type, data, title, description, is_main })
}

// POST /api/articles/{id}/upload_media
#[utoipa::path(
    post,
    path = "/api/articles/{id}/upload_media",
    tag = "News",
    params(("id" = Uuid, Path, description = "ID do artigo")),
    responses(
        (status = 201, description = "Mídia anexada (multipart: file, title, description, is_main)", body = Media),
        (status = 400, description = "Ficheiro grande demais ou tipo não permitido")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_media(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let media = service
        .upload_media(&reader, id, upload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(media)))
}

// DELETE /api/articles/{id}/media/{media_id}
#[utoipa::path(
    delete,
    path = "/api/articles/{id}/media/{media_id}",
    tag = "News",
    params(
        ("id" = Uuid, Path, description = "ID do artigo"),
        ("media_id" = Uuid, Path, description = "ID da mídia")
    ),
    responses(
        (status = 204, description = "Mídia removida"),
        (status = 404, description = "Mídia não encontrada neste artigo")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_media(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id, media_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    service
        .delete_media(&reader, id, media_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn forwarded_ip_takes_the_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let view = view_context(&headers);
        assert_eq!(view.ip_address.as_deref(), Some("203.0.113.7"));
        assert_eq!(view.user_agent, "curl/8.0");
    }

    #[test]
    fn missing_headers_give_empty_context() {
        let view = view_context(&HeaderMap::new());
        assert_eq!(view.ip_address, None);
        assert_eq!(view.user_agent, "");
    }
}
