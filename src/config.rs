// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! The process configuration is resolved exactly once at startup from a flat
//! string-keyed source (normally the process environment, after a `.env` file
//! has been merged into it) and then shared read-only as
//! `Arc<RuntimeConfig>`.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NODE_ENV` | Deployment environment | `development` |
//! | `PROTOCOL` | Advertised protocol | `http` |
//! | `HOST` | Server bind address | `0.0.0.0` in production, else `localhost` |
//! | `PORT` | Server bind port | `3000` |
//! | `MONGODB_URI_<ENV>` | Environment-specific database URI | - |
//! | `MONGODB_URI_PRD` | Short production alias | - |
//! | `MONGODB_URI` | Generic database URI | Required outside `test` |
//! | `JWT_SECRET` | HS256 signing secret for bearer tokens | Required |
//! | `RATE_LIMIT_WINDOW_MS` | Rate limit window | `900000` |
//! | `RATE_LIMIT_MAX` | Requests allowed per window | `100` |
//! | `API_BASE_PATH` | First API path segment | `api` |
//! | `API_VERSION` | API version segment | `v1` |
//! | `DOCS_PATH` | Documentation path segment | `docs` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `debug` in development, else `info` |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::path::PathBuf;
use std::sync::OnceLock;

use thiserror::Error;

pub const NODE_ENV_ENV: &str = "NODE_ENV";
pub const PROTOCOL_ENV: &str = "PROTOCOL";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MONGODB_URI_ENV: &str = "MONGODB_URI";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const RATE_LIMIT_WINDOW_MS_ENV: &str = "RATE_LIMIT_WINDOW_MS";
pub const RATE_LIMIT_MAX_ENV: &str = "RATE_LIMIT_MAX";
pub const API_BASE_PATH_ENV: &str = "API_BASE_PATH";
pub const API_VERSION_ENV: &str = "API_VERSION";
pub const DOCS_PATH_ENV: &str = "DOCS_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Database used when running the test suite without any Mongo URI configured.
pub const TEST_MONGODB_URI: &str = "mongodb://127.0.0.1:27017/chatlogger_test";

const DEFAULT_NODE_ENV: &str = "development";
const DEFAULT_PROTOCOL: &str = "http";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 15 * 60 * 1000;
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_API_BASE_PATH: &str = "api";
const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_DOCS_PATH: &str = "docs";

/// Fatal configuration errors. Any of these aborts startup.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET is not set. Please configure it in your environment.")]
    MissingJwtSecret,

    #[error(
        "MongoDB URI is not set for the '{node_env}' environment. \
         Set {} or MONGODB_URI.",
        env_specific_mongodb_keys(node_env).join(" or ")
    )]
    MissingMongoUri { node_env: String },

    #[error("{key} must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
}

// =============================================================================
// Sources
// =============================================================================

/// A flat, string-keyed view of configuration values.
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl ConfigSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// What happened when the `.env` file was loaded.
///
/// Loading runs before logging is installed, so the outcome is kept and
/// reported by the caller once a subscriber exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileStatus {
    Loaded(PathBuf),
    NotFound,
    Failed(String),
}

impl EnvFileStatus {
    /// Log the outcome. Call after the tracing subscriber is installed.
    pub fn report(&self) {
        match self {
            EnvFileStatus::Loaded(path) => {
                tracing::debug!(path = %path.display(), "Loaded environment file")
            }
            EnvFileStatus::NotFound => {
                tracing::debug!("No .env file found, using process environment")
            }
            EnvFileStatus::Failed(error) => {
                tracing::warn!(error = %error, "Failed to load .env file")
            }
        }
    }
}

/// Loads an external `.env`-style file into the process environment.
pub trait EnvFileLoader {
    fn load(&self) -> EnvFileStatus;
}

/// `.env` loader backed by `dotenvy`. A missing file is not an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotenvLoader;

impl EnvFileLoader for DotenvLoader {
    fn load(&self) -> EnvFileStatus {
        match dotenvy::dotenv() {
            Ok(path) => EnvFileStatus::Loaded(path),
            Err(e) if e.not_found() => EnvFileStatus::NotFound,
            Err(e) => EnvFileStatus::Failed(e.to_string()),
        }
    }
}

// =============================================================================
// Resolver
// =============================================================================

/// Resolves [`RuntimeConfig`] from a [`ConfigSource`].
///
/// The env-file loader runs once, on the first call to [`resolve`](Self::resolve),
/// before any key is read.
pub struct ConfigResolver<L = DotenvLoader> {
    loader: L,
    env_file: OnceLock<EnvFileStatus>,
}

impl ConfigResolver<DotenvLoader> {
    pub fn new() -> Self {
        Self::with_loader(DotenvLoader)
    }
}

impl Default for ConfigResolver<DotenvLoader> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: EnvFileLoader> ConfigResolver<L> {
    pub fn with_loader(loader: L) -> Self {
        Self {
            loader,
            env_file: OnceLock::new(),
        }
    }

    /// Resolve a validated configuration.
    ///
    /// # Errors
    /// Fails when `JWT_SECRET` is missing, when no Mongo URI can be found
    /// outside the `test` environment, or when a numeric key does not parse.
    pub fn resolve<S>(&self, source: &S) -> Result<RuntimeConfig, ConfigError>
    where
        S: ConfigSource + ?Sized,
    {
        self.env_file.get_or_init(|| self.loader.load());
        RuntimeConfig::from_source(source)
    }

    /// Outcome of the `.env` load, once [`resolve`](Self::resolve) has run.
    pub fn env_file_status(&self) -> Option<&EnvFileStatus> {
        self.env_file.get()
    }
}

// =============================================================================
// Runtime configuration
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Immutable process configuration.
///
/// Fields are only reachable through accessors; share it as
/// `Arc<RuntimeConfig>`.
#[derive(Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    protocol: String,
    host: String,
    port: u16,
    node_env: String,
    mongodb_uri: String,
    jwt_secret: String,
    rate_limit_window_ms: u64,
    rate_limit_max: u32,
    api_base_path: String,
    api_version: String,
    docs_path: String,
    log_format: LogFormat,
}

impl RuntimeConfig {
    fn from_source<S>(source: &S) -> Result<Self, ConfigError>
    where
        S: ConfigSource + ?Sized,
    {
        let node_env = read(source, NODE_ENV_ENV).unwrap_or_else(|| DEFAULT_NODE_ENV.to_string());

        let jwt_secret = read(source, JWT_SECRET_ENV).ok_or(ConfigError::MissingJwtSecret)?;
        let mongodb_uri = resolve_mongodb_uri(source, &node_env)?;

        let host = read(source, HOST_ENV).unwrap_or_else(|| {
            if node_env == "production" {
                "0.0.0.0".to_string()
            } else {
                "localhost".to_string()
            }
        });

        Ok(Self {
            protocol: read_or(source, PROTOCOL_ENV, DEFAULT_PROTOCOL),
            host,
            port: read_number(source, PORT_ENV, DEFAULT_PORT)?,
            mongodb_uri,
            jwt_secret,
            rate_limit_window_ms: read_number(
                source,
                RATE_LIMIT_WINDOW_MS_ENV,
                DEFAULT_RATE_LIMIT_WINDOW_MS,
            )?,
            rate_limit_max: read_number(source, RATE_LIMIT_MAX_ENV, DEFAULT_RATE_LIMIT_MAX)?,
            api_base_path: read_or(source, API_BASE_PATH_ENV, DEFAULT_API_BASE_PATH),
            api_version: read_or(source, API_VERSION_ENV, DEFAULT_API_VERSION),
            docs_path: read_or(source, DOCS_PATH_ENV, DEFAULT_DOCS_PATH),
            log_format: LogFormat::parse(read(source, LOG_FORMAT_ENV).as_deref()),
            node_env,
        })
    }

    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn node_env(&self) -> &str {
        &self.node_env
    }

    pub fn is_production(&self) -> bool {
        self.node_env == "production"
    }

    pub fn is_development(&self) -> bool {
        self.node_env == DEFAULT_NODE_ENV
    }

    pub fn mongodb_uri(&self) -> &str {
        &self.mongodb_uri
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn rate_limit_window_ms(&self) -> u64 {
        self.rate_limit_window_ms
    }

    pub fn rate_limit_max(&self) -> u32 {
        self.rate_limit_max
    }

    pub fn api_base_path(&self) -> &str {
        &self.api_base_path
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn docs_path(&self) -> &str {
        &self.docs_path
    }

    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// `/<apiBasePath>/<docsPath>`, where the Swagger UI is served.
    pub fn api_documentation_path(&self) -> String {
        format!("/{}/{}", self.api_base_path, self.docs_path)
    }

    /// The OpenAPI document, next to the Swagger UI.
    pub fn api_documentation_url(&self) -> String {
        format!("{}.json", self.api_documentation_path())
    }

    /// `/<apiBasePath>/<apiVersion>`, the mount point of the versioned routes.
    pub fn api_prefix(&self) -> String {
        format!("/{}/{}", self.api_base_path, self.api_version)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("protocol", &self.protocol)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("node_env", &self.node_env)
            .field("mongodb_uri", &self.mongodb_uri)
            .field("jwt_secret", &"<redacted>")
            .field("rate_limit_window_ms", &self.rate_limit_window_ms)
            .field("rate_limit_max", &self.rate_limit_max)
            .field("api_base_path", &self.api_base_path)
            .field("api_version", &self.api_version)
            .field("docs_path", &self.docs_path)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Read a key, treating empty values as absent.
fn read<S>(source: &S, key: &str) -> Option<String>
where
    S: ConfigSource + ?Sized,
{
    source.get(key).filter(|value| !value.is_empty())
}

fn read_or<S>(source: &S, key: &str, default: &str) -> String
where
    S: ConfigSource + ?Sized,
{
    read(source, key).unwrap_or_else(|| default.to_string())
}

fn read_number<S, T>(source: &S, key: &'static str, default: T) -> Result<T, ConfigError>
where
    S: ConfigSource + ?Sized,
    T: FromStr,
{
    match read(source, key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
    }
}

/// Candidate keys for the environment-specific Mongo URI, in lookup order.
///
/// Production also answers to the short `PRD` suffix; no other environment
/// has an alias.
fn env_specific_mongodb_keys(node_env: &str) -> Vec<String> {
    let mut keys = vec![format!("{MONGODB_URI_ENV}_{}", node_env.to_uppercase())];
    if node_env == "production" {
        keys.push(format!("{MONGODB_URI_ENV}_PRD"));
    }
    keys
}

fn resolve_mongodb_uri<S>(source: &S, node_env: &str) -> Result<String, ConfigError>
where
    S: ConfigSource + ?Sized,
{
    let uri = env_specific_mongodb_keys(node_env)
        .iter()
        .find_map(|key| read(source, key))
        .or_else(|| read(source, MONGODB_URI_ENV));

    match uri {
        Some(uri) => Ok(uri),
        None if node_env == "test" => Ok(TEST_MONGODB_URI.to_string()),
        None => Err(ConfigError::MissingMongoUri {
            node_env: node_env.to_string(),
        }),
    }
}
