// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! This module defines the request and response data structures used by
//! the REST API. All types derive `Serialize`/`Deserialize` and `ToSchema`
//! for automatic JSON handling and OpenAPI documentation. JSON field names
//! are camelCase.
//!
//! ## Model Categories
//!
//! - **Chats**: Logged chat sessions, always owned by one organization
//! - **Requests**: Create/update bodies and their validation
//! - **Listings**: Pagination parameters and paged responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::ApiError;

const MAX_TITLE_LEN: usize = 200;
const MAX_TAGS: usize = 20;
const MAX_TAG_LEN: usize = 50;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

// =============================================================================
// Chat Models
// =============================================================================

/// Where a chat was started.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatSource {
    #[default]
    Web,
    Mobile,
    Api,
}

/// A logged chat session.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    /// Unique identifier for this chat.
    pub id: Uuid,
    /// User who created the chat.
    pub user_id: String,
    /// Organization the chat belongs to.
    pub organization_id: String,
    /// Chat title/subject.
    pub title: String,
    /// Source of the chat.
    pub source: ChatSource,
    /// Additional data about the chat.
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
    /// Tags for categorizing the chat.
    pub tags: Vec<String>,
    /// Whether the chat is active.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a chat.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    /// Chat title/subject (1-200 characters).
    pub title: String,
    /// Source of the chat (defaults to `web`).
    #[serde(default)]
    pub source: ChatSource,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Map<String, Value>,
}

impl CreateChatRequest {
    /// Validate and normalize (trim) the request.
    pub fn validated(mut self) -> Result<Self, ApiError> {
        self.title = validate_title(&self.title)?;
        self.tags = validate_tags(self.tags)?;
        Ok(self)
    }
}

/// Partial update of a chat. At least one field must be present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChatRequest {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
    #[schema(value_type = Option<Object>)]
    pub metadata: Option<Map<String, Value>>,
    pub is_active: Option<bool>,
}

impl UpdateChatRequest {
    /// Validate and normalize (trim) the request.
    pub fn validated(mut self) -> Result<Self, ApiError> {
        if self.title.is_none()
            && self.tags.is_none()
            && self.metadata.is_none()
            && self.is_active.is_none()
        {
            return Err(ApiError::bad_request(
                "At least one of title, tags, metadata or isActive must be provided",
            ));
        }
        if let Some(title) = &self.title {
            self.title = Some(validate_title(title)?);
        }
        if let Some(tags) = self.tags.take() {
            self.tags = Some(validate_tags(tags)?);
        }
        Ok(self)
    }
}

fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::bad_request("title is required"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_tags(tags: Vec<String>) -> Result<Vec<String>, ApiError> {
    if tags.len() > MAX_TAGS {
        return Err(ApiError::bad_request(format!(
            "at most {MAX_TAGS} tags are allowed"
        )));
    }
    tags.into_iter()
        .map(|tag| {
            let tag = tag.trim();
            if tag.is_empty() || tag.chars().count() > MAX_TAG_LEN {
                Err(ApiError::bad_request(format!(
                    "tags must be 1-{MAX_TAG_LEN} characters"
                )))
            } else {
                Ok(tag.to_string())
            }
        })
        .collect()
}

// =============================================================================
// Listings
// =============================================================================

/// Query parameters for listing the caller's chats.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListChatsQuery {
    /// Page number (default 1).
    pub page: Option<u32>,
    /// Items per page (1-100, default 10).
    pub limit: Option<u32>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Query parameters for searching chats.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchChatsQuery {
    /// Text matched against titles and tags (case-insensitive).
    pub query: Option<String>,
    /// Page number (default 1).
    pub page: Option<u32>,
    /// Items per page (1-100, default 10).
    pub limit: Option<u32>,
}

/// Validated page selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, ApiError> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_LIMIT);

        if page == 0 {
            return Err(ApiError::bad_request("page must be at least 1"));
        }
        if limit == 0 || limit > MAX_LIMIT {
            return Err(ApiError::bad_request(format!(
                "limit must be between 1 and {MAX_LIMIT}"
            )));
        }
        Ok(Self { page, limit })
    }

    fn offset(&self) -> usize {
        (self.page as usize - 1) * self.limit as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One page of chats.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatPage {
    pub chats: Vec<Chat>,
    pub total_pages: u64,
    pub current_page: u32,
    pub total_chats: u64,
}

impl ChatPage {
    /// Cut `page` out of `chats`, which must already be in display order.
    pub fn paginate(chats: Vec<Chat>, page: Pagination) -> Self {
        let total = chats.len() as u64;
        let total_pages = total.div_ceil(u64::from(page.limit));
        let chats = chats
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .collect();

        Self {
            chats,
            total_pages,
            current_page: page.page,
            total_chats: total,
        }
    }
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMutationResponse {
    pub message: String,
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(n: u32) -> Chat {
        let now = Utc::now();
        Chat {
            id: Uuid::new_v4(),
            user_id: "user_1".into(),
            organization_id: "org_1".into(),
            title: format!("chat {n}"),
            source: ChatSource::Web,
            metadata: Map::new(),
            tags: Vec::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn create_request_defaults_and_trims() {
        let request: CreateChatRequest =
            serde_json::from_str(r#"{"title":"  Password Reset Help  ","tags":[" support "]}"#)
                .unwrap();
        let request = request.validated().unwrap();

        assert_eq!(request.title, "Password Reset Help");
        assert_eq!(request.source, ChatSource::Web);
        assert_eq!(request.tags, vec!["support".to_string()]);
        assert!(request.metadata.is_empty());
    }

    #[test]
    fn create_request_rejects_bad_titles_and_tags() {
        let blank = CreateChatRequest {
            title: "   ".into(),
            source: ChatSource::Api,
            tags: Vec::new(),
            metadata: Map::new(),
        };
        assert!(blank.validated().is_err());

        let long = CreateChatRequest {
            title: "x".repeat(MAX_TITLE_LEN + 1),
            source: ChatSource::Api,
            tags: Vec::new(),
            metadata: Map::new(),
        };
        assert!(long.validated().is_err());

        let empty_tag = CreateChatRequest {
            title: "ok".into(),
            source: ChatSource::Api,
            tags: vec![String::new()],
            metadata: Map::new(),
        };
        assert!(empty_tag.validated().is_err());
    }

    #[test]
    fn unknown_source_fails_to_deserialize() {
        let result = serde_json::from_str::<CreateChatRequest>(r#"{"title":"t","source":"fax"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_update_is_rejected() {
        assert!(UpdateChatRequest::default().validated().is_err());

        let update = UpdateChatRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(update.validated().is_ok());
    }

    #[test]
    fn pagination_bounds() {
        assert_eq!(Pagination::new(None, None).unwrap(), Pagination::default());
        assert!(Pagination::new(Some(0), None).is_err());
        assert!(Pagination::new(None, Some(0)).is_err());
        assert!(Pagination::new(None, Some(MAX_LIMIT + 1)).is_err());
        assert!(Pagination::new(Some(3), Some(MAX_LIMIT)).is_ok());
    }

    #[test]
    fn paginate_reports_totals() {
        let chats: Vec<Chat> = (0..25).map(chat).collect();
        let page = ChatPage::paginate(
            chats.clone(),
            Pagination {
                page: 3,
                limit: 10,
            },
        );

        assert_eq!(page.total_chats, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 3);
        assert_eq!(page.chats, chats[20..].to_vec());
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = ChatPage::paginate(
            vec![chat(0)],
            Pagination {
                page: 5,
                limit: 10,
            },
        );
        assert!(page.chats.is_empty());
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn chat_serializes_camel_case() {
        let value = serde_json::to_value(chat(1)).unwrap();
        assert!(value.get("organizationId").is_some());
        assert!(value.get("isActive").is_some());
        assert_eq!(value["source"], "web");
    }
}
