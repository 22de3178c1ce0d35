// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Logging setup.
//!
//! `RUST_LOG` overrides the default filter when set. `LOG_FORMAT=json` switches
//! from human-readable output to one JSON object per line.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{LogFormat, RuntimeConfig};

/// Filter used when `RUST_LOG` is unset or invalid.
pub fn default_filter(config: &RuntimeConfig) -> &'static str {
    if config.is_development() {
        "debug,tower_http=debug"
    } else {
        "info,tower_http=debug"
    }
}

/// Install the global subscriber. Call once, at startup.
pub fn init(config: &RuntimeConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));

    let fmt_layer = match config.log_format() {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::config_with;

    #[test]
    fn development_logs_at_debug() {
        let config = config_with(&[
            ("NODE_ENV", "development"),
            ("MONGODB_URI", "mongodb://localhost:27017/chatlogger"),
        ]);
        assert_eq!(default_filter(&config), "debug,tower_http=debug");
    }

    #[test]
    fn other_environments_log_at_info() {
        let config = config_with(&[]);
        assert_eq!(default_filter(&config), "info,tower_http=debug");
    }
}
