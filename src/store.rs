// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory chat store.
//!
//! Every read and write is scoped by [`OrganizationContext`]: a chat that
//! belongs to another organization behaves exactly like a missing one.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::auth::OrganizationContext;
use crate::error::ApiError;
use crate::models::{Chat, ChatPage, CreateChatRequest, Pagination, UpdateChatRequest};

#[derive(Default)]
pub struct ChatStore {
    chats: HashMap<Uuid, Chat>,
}

impl ChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_chat(
        &mut self,
        organization: &OrganizationContext,
        user_id: &str,
        request: CreateChatRequest,
    ) -> Chat {
        let now = Utc::now();
        let chat = Chat {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            organization_id: organization.organization_id.clone(),
            title: request.title,
            source: request.source,
            metadata: request.metadata,
            tags: request.tags,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.chats.insert(chat.id, chat.clone());
        chat
    }

    /// The caller's chats in the organization, newest first.
    pub fn list_chats(
        &self,
        organization: &OrganizationContext,
        user_id: &str,
        is_active: Option<bool>,
        page: Pagination,
    ) -> ChatPage {
        let chats = self.collect_sorted(|chat| {
            chat.organization_id == organization.organization_id
                && chat.user_id == user_id
                && is_active.is_none_or(|active| chat.is_active == active)
        });
        ChatPage::paginate(chats, page)
    }

    /// Organization-wide, case-insensitive search over titles and tags.
    pub fn search_chats(
        &self,
        organization: &OrganizationContext,
        query: &str,
        page: Pagination,
    ) -> ChatPage {
        let needle = query.to_lowercase();
        let chats = self.collect_sorted(|chat| {
            chat.organization_id == organization.organization_id
                && (chat.title.to_lowercase().contains(&needle)
                    || chat
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle)))
        });
        ChatPage::paginate(chats, page)
    }

    pub fn chat(&self, organization: &OrganizationContext, chat_id: Uuid) -> Result<Chat, ApiError> {
        self.chats
            .get(&chat_id)
            .filter(|chat| chat.organization_id == organization.organization_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Chat not found"))
    }

    pub fn update_chat(
        &mut self,
        organization: &OrganizationContext,
        chat_id: Uuid,
        request: UpdateChatRequest,
    ) -> Result<Chat, ApiError> {
        let chat = self
            .chats
            .get_mut(&chat_id)
            .filter(|chat| chat.organization_id == organization.organization_id)
            .ok_or_else(|| ApiError::not_found("Chat not found"))?;

        if let Some(title) = request.title {
            chat.title = title;
        }
        if let Some(tags) = request.tags {
            chat.tags = tags;
        }
        if let Some(metadata) = request.metadata {
            chat.metadata = metadata;
        }
        if let Some(is_active) = request.is_active {
            chat.is_active = is_active;
        }
        chat.updated_at = Utc::now();

        Ok(chat.clone())
    }

    pub fn delete_chat(
        &mut self,
        organization: &OrganizationContext,
        chat_id: Uuid,
    ) -> Result<(), ApiError> {
        let owned = self
            .chats
            .get(&chat_id)
            .is_some_and(|chat| chat.organization_id == organization.organization_id);

        if owned {
            self.chats.remove(&chat_id);
            Ok(())
        } else {
            Err(ApiError::not_found("Chat not found"))
        }
    }

    fn collect_sorted(&self, keep: impl Fn(&Chat) -> bool) -> Vec<Chat> {
        let mut chats: Vec<Chat> = self.chats.values().filter(|chat| keep(chat)).cloned().collect();
        chats.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        chats
    }
}
