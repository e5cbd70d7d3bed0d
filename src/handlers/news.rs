// src/handlers/news.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::news::{Category, CreateCategoryPayload, CreateTagPayload, Tag},
};

// GET /api/news/categories
#[utoipa::path(
    get,
    path = "/api/news/categories",
    tag = "News",
    responses(
        (status = 200, description = "Categorias ativas", body = Vec<Category>)
    )
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let categories = app_state
        .article_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(categories)))
}

// POST /api/news/categories
#[utoipa::path(
    post,
    path = "/api/news/categories",
    tag = "News",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = Category),
        (status = 403, description = "Só ADMIN de empresa"),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let category = service
        .create_category(&reader, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/news/tags
#[utoipa::path(
    get,
    path = "/api/news/tags",
    tag = "News",
    responses(
        (status = 200, description = "Tags", body = Vec<Tag>)
    )
)]
pub async fn list_tags(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let tags = app_state
        .article_service
        .list_tags()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(tags)))
}

// POST /api/news/tags
#[utoipa::path(
    post,
    path = "/api/news/tags",
    tag = "News",
    request_body = CreateTagPayload,
    responses(
        (status = 201, description = "Tag criada", body = Tag),
        (status = 409, description = "Nome já em uso")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tag(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTagPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let service = &app_state.article_service;
    let reader = service
        .reader(Some(user.0.id))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let tag = service
        .create_tag(&reader, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(tag)))
}
