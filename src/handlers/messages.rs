// src/handlers/messages.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::messaging::{ConversationQuery, ConversationWithMessages, Message, SendMessagePayload},
};

// POST /api/messages/send
#[utoipa::path(
    post,
    path = "/api/messages/send",
    tag = "Messages",
    request_body = SendMessagePayload,
    responses(
        (status = 201, description = "Mensagem enviada", body = Message),
        (status = 400, description = "Destino incoerente com o tipo"),
        (status = 403, description = "Remetente não é membro do grupo")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_message(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<SendMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let message = app_state
        .message_service
        .send_message(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(message)))
}

// GET /api/messages
// Tudo o que o utilizador pode ler, mais recentes primeiro.
#[utoipa::path(
    get,
    path = "/api/messages",
    tag = "Messages",
    responses(
        (status = 200, description = "Mensagens visíveis", body = Vec<Message>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .message_service
        .list_visible_messages(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// GET /api/messages/conversation?with=<user_id>
#[utoipa::path(
    get,
    path = "/api/messages/conversation",
    tag = "Messages",
    params(ConversationQuery),
    responses(
        (status = 200, description = "Mensagens diretas entre os dois, em ordem cronológica", body = Vec<Message>)
    ),
    security(("api_jwt" = []))
)]
pub async fn conversation(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Query(query): Query<ConversationQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .message_service
        .conversation(user.0.id, query.with)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}

// GET /api/messages/{id}
#[utoipa::path(
    get,
    path = "/api/messages/{id}",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 200, description = "Mensagem", body = Message),
        (status = 403, description = "Mensagem não visível para o utilizador"),
        (status = 404, description = "Mensagem não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_message(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let message = app_state
        .message_service
        .get_message(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(message)))
}

// POST /api/messages/{id}/read
#[utoipa::path(
    post,
    path = "/api/messages/{id}/read",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "ID da mensagem")),
    responses(
        (status = 204, description = "Marcada como lida"),
        (status = 403, description = "Só o destinatário")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_read(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .message_service
        .mark_read(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/conversations
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "Messages",
    responses(
        (status = 200, description = "Conversas diretas com as últimas mensagens", body = Vec<ConversationWithMessages>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_conversations(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let conversations = app_state
        .message_service
        .list_conversations(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(conversations)))
}

// GET /api/groups/{id}/messages
#[utoipa::path(
    get,
    path = "/api/groups/{id}/messages",
    tag = "Messages",
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Mensagens do grupo visíveis ao membro", body = Vec<Message>),
        (status = 403, description = "Não é membro do grupo")
    ),
    security(("api_jwt" = []))
)]
pub async fn group_messages(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let messages = app_state
        .message_service
        .group_messages(user.0.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(messages)))
}
