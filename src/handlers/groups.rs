// src/handlers/groups.rs

use axum::{
    extract::{Path, State},
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
    models::group::{
        AddMemberPayload, AnswerIntegrationPayload, CreateGroupPayload,
        CreateIntegrationRequestPayload, Group, GroupDetail, GroupMember, GroupMemberEntry,
        IntegrationRequest, MemberRole,
    },
};

// ---
// Grupos
// ---

#[utoipa::path(
    get,
    path = "/api/groups",
    tag = "Groups",
    responses(
        (status = 200, description = "Grupos da empresa do utilizador e grupos de que é membro", body = Vec<GroupDetail>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_groups(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let groups = app_state
        .group_service
        .list_groups(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(groups)))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    tag = "Groups",
    request_body = CreateGroupPayload,
    responses(
        (status = 201, description = "Grupo criado; o criador entra como ADMIN", body = Group),
        (status = 409, description = "Já existe um grupo com este nome na empresa")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_group(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateGroupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let group = app_state
        .group_service
        .create_group(user.0.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(group)))
}

#[utoipa::path(
    get,
    path = "/api/groups/{id}",
    tag = "Groups",
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Grupo com o número de membros", body = GroupDetail),
        (status = 404, description = "Grupo não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_group(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let group = app_state
        .group_service
        .get_group(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(group)))
}

// ---
// Membros
// ---

#[utoipa::path(
    get,
    path = "/api/groups/{id}/members",
    tag = "Groups",
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses(
        (status = 200, description = "Membros do grupo", body = Vec<GroupMemberEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_members(
    State(app_state): State<AppState>,
    locale: Locale,
    _user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let members = app_state
        .group_service
        .list_members(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(members)))
}

#[utoipa::path(
    post,
    path = "/api/groups/{id}/members",
    tag = "Groups",
    request_body = AddMemberPayload,
    params(("id" = Uuid, Path, description = "ID do grupo")),
    responses(
        (status = 201, description = "Membro adicionado", body = GroupMember),
        (status = 403, description = "Só ADMIN do grupo"),
        (status = 409, description = "Já é membro")
    ),
    security(("api_jwt" = []))
)]
pub async fn add_member(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddMemberPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let member = app_state
        .group_service
        .add_member(user.0.id, id, payload.user_id, payload.role.unwrap_or(MemberRole::Member))
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(member)))
}

#[utoipa::path(
    delete,
    path = "/api/groups/{id}/members/{user_id}",
    tag = "Groups",
    params(
        ("id" = Uuid, Path, description = "ID do grupo"),
        ("user_id" = Uuid, Path, description = "Membro a remover")
    ),
    responses(
        (status = 204, description = "Membro removido"),
        (status = 422, description = "Dono ou último ADMIN não pode sair")
    ),
    security(("api_jwt" = []))
)]
pub async fn remove_member(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .group_service
        .remove_member(user.0.id, id, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Pedidos de integração
// ---

#[utoipa::path(
    get,
    path = "/api/integration-requests",
    tag = "Groups",
    responses(
        (status = 200, description = "Pedidos feitos por mim ou dirigidos a grupos que administro", body = Vec<IntegrationRequest>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let requests = app_state
        .group_service
        .list_requests(user.0.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(requests)))
}

#[utoipa::path(
    post,
    path = "/api/integration-requests",
    tag = "Groups",
    request_body = CreateIntegrationRequestPayload,
    responses(
        (status = 201, description = "Pedido criado (PENDING)", body = IntegrationRequest),
        (status = 409, description = "Pedido já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateIntegrationRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .group_service
        .create_request(user.0.id, payload.group_id, payload.message.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    post,
    path = "/api/integration-requests/{id}/answer",
    tag = "Groups",
    request_body = AnswerIntegrationPayload,
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido aceite ou recusado", body = IntegrationRequest),
        (status = 403, description = "Só ADMIN do grupo"),
        (status = 422, description = "Pedido já respondido")
    ),
    security(("api_jwt" = []))
)]
pub async fn answer_request(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AnswerIntegrationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .group_service
        .answer_request(user.0.id, id, payload.accept)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}
