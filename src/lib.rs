// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chatlogger - Multi-tenant Chat Logging API
//!
//! Every `/chats` request is authenticated by a bearer token or, failing
//! that, an API key, and then scoped to exactly one organization.
//!
//! ## Modules
//!
//! - `config` - Environment-driven runtime configuration
//! - `auth` - Credential gate and organization scoping
//! - `api` - HTTP API handlers (Axum)
//! - `store` - Tenant-scoped chat storage
//! - `rate_limit` - Per-client request limiting

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_support;
