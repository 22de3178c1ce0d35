// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{
        api_key::API_KEY_HEADER,
        middleware::{attach_organization, require_auth},
        OrganizationContext,
    },
    config::RuntimeConfig,
    models::{
        Chat, ChatMutationResponse, ChatPage, ChatResponse, ChatSource, CreateChatRequest,
        MessageResponse, UpdateChatRequest,
    },
    rate_limit::rate_limit,
    state::AppState,
};

pub mod chats;
pub mod extract;
pub mod health;

pub fn router(state: AppState) -> Router {
    let config = state.config.clone();

    let chat_routes = Router::new()
        .route("/chats", get(chats::list_chats).post(chats::create_chat))
        .route("/chats/search", get(chats::search_chats))
        .route(
            "/chats/{chat_id}",
            get(chats::get_chat)
                .put(chats::update_chat)
                .delete(chats::delete_chat),
        )
        .route_layer(middleware::from_fn(attach_organization))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/health", get(health::health))
        .nest(&config.api_prefix(), chat_routes)
        .with_state(state)
        .merge(
            SwaggerUi::new(config.api_documentation_path())
                .url(config.api_documentation_url(), ApiDoc::for_config(&config)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Registers the two credential schemes the gate accepts.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(health::health),
    components(
        schemas(
            Chat,
            ChatSource,
            ChatPage,
            ChatResponse,
            ChatMutationResponse,
            MessageResponse,
            CreateChatRequest,
            UpdateChatRequest,
            OrganizationContext,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service liveness"),
        (name = "Chats", description = "Tenant-scoped chat logging")
    ),
    info(
        title = "Chatlogger API",
        description = "Multi-tenant chat logging. Authenticate with a bearer token or an X-API-Key header."
    )
)]
struct ApiDoc;

#[derive(OpenApi)]
#[openapi(paths(
    chats::create_chat,
    chats::list_chats,
    chats::search_chats,
    chats::get_chat,
    chats::update_chat,
    chats::delete_chat
))]
struct ChatsApi;

impl ApiDoc {
    /// The document with chat paths mounted under the configured API prefix.
    fn for_config(config: &RuntimeConfig) -> utoipa::openapi::OpenApi {
        ApiDoc::openapi().nest(config.api_prefix(), ChatsApi::openapi())
    }
}
