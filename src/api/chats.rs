// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::extract::{ApiJson, ApiQuery};
use crate::{
    auth::{Auth, Tenant},
    error::ApiError,
    models::{
        ChatMutationResponse, ChatPage, ChatResponse, CreateChatRequest, ListChatsQuery,
        MessageResponse, Pagination, SearchChatsQuery, UpdateChatRequest,
    },
    state::AppState,
};

fn parse_chat_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request("Invalid chatId"))
}

#[utoipa::path(
    post,
    path = "/chats",
    request_body = CreateChatRequest,
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 201, description = "Chat created", body = ChatMutationResponse),
        (status = 400, description = "Invalid body or principal without organization"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_chat(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Tenant(organization): Tenant,
    ApiJson(request): ApiJson<CreateChatRequest>,
) -> Result<(StatusCode, Json<ChatMutationResponse>), ApiError> {
    let request = request.validated()?;
    let chat = state
        .store
        .write()
        .await
        .create_chat(&organization, principal.subject(), request);

    tracing::info!(
        chat_id = %chat.id,
        organization_id = %organization.organization_id,
        auth = %principal.kind(),
        "Chat created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ChatMutationResponse {
            message: "Chat created successfully".to_string(),
            chat,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/chats",
    params(ListChatsQuery),
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "The caller's chats, newest first", body = ChatPage),
        (status = 400, description = "Invalid pagination"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_chats(
    State(state): State<AppState>,
    Auth(principal): Auth,
    Tenant(organization): Tenant,
    ApiQuery(query): ApiQuery<ListChatsQuery>,
) -> Result<Json<ChatPage>, ApiError> {
    let page = Pagination::new(query.page, query.limit)?;
    let store = state.store.read().await;
    Ok(Json(store.list_chats(
        &organization,
        principal.subject(),
        query.is_active,
        page,
    )))
}

#[utoipa::path(
    get,
    path = "/chats/search",
    params(SearchChatsQuery),
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Matching chats in the organization", body = ChatPage),
        (status = 400, description = "Missing query or invalid pagination"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn search_chats(
    State(state): State<AppState>,
    Tenant(organization): Tenant,
    ApiQuery(query): ApiQuery<SearchChatsQuery>,
) -> Result<Json<ChatPage>, ApiError> {
    let text = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::bad_request("Search query is required"))?;
    let page = Pagination::new(query.page, query.limit)?;

    let store = state.store.read().await;
    Ok(Json(store.search_chats(&organization, text, page)))
}

#[utoipa::path(
    get,
    path = "/chats/{chat_id}",
    params(("chat_id" = String, Path, description = "Chat identifier (UUID)")),
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, body = ChatResponse),
        (status = 400, description = "Invalid chatId"),
        (status = 404, description = "No such chat in this organization")
    )
)]
pub async fn get_chat(
    State(state): State<AppState>,
    Tenant(organization): Tenant,
    Path(chat_id): Path<String>,
) -> Result<Json<ChatResponse>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    let chat = state.store.read().await.chat(&organization, chat_id)?;
    Ok(Json(ChatResponse { chat }))
}

#[utoipa::path(
    put,
    path = "/chats/{chat_id}",
    params(("chat_id" = String, Path, description = "Chat identifier (UUID)")),
    request_body = UpdateChatRequest,
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, body = ChatMutationResponse),
        (status = 400, description = "Invalid chatId or body"),
        (status = 404, description = "No such chat in this organization")
    )
)]
pub async fn update_chat(
    State(state): State<AppState>,
    Tenant(organization): Tenant,
    Path(chat_id): Path<String>,
    ApiJson(request): ApiJson<UpdateChatRequest>,
) -> Result<Json<ChatMutationResponse>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    let request = request.validated()?;
    let chat = state
        .store
        .write()
        .await
        .update_chat(&organization, chat_id, request)?;

    Ok(Json(ChatMutationResponse {
        message: "Chat updated successfully".to_string(),
        chat,
    }))
}

#[utoipa::path(
    delete,
    path = "/chats/{chat_id}",
    params(("chat_id" = String, Path, description = "Chat identifier (UUID)")),
    tag = "Chats",
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, body = MessageResponse),
        (status = 400, description = "Invalid chatId"),
        (status = 404, description = "No such chat in this organization")
    )
)]
pub async fn delete_chat(
    State(state): State<AppState>,
    Tenant(organization): Tenant,
    Path(chat_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let chat_id = parse_chat_id(&chat_id)?;
    state
        .store
        .write()
        .await
        .delete_chat(&organization, chat_id)?;

    tracing::info!(
        chat_id = %chat_id,
        organization_id = %organization.organization_id,
        "Chat deleted"
    );

    Ok(Json(MessageResponse {
        message: "Chat deleted successfully".to_string(),
    }))
}
